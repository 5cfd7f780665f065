/*
    TapeFox

    Copyright 2024 Daniel Balsom

    Permission is hereby granted, free of charge, to any person obtaining a
    copy of this software and associated documentation files (the “Software”),
    to deal in the Software without restriction, including without limitation
    the rights to use, copy, modify, merge, publish, distribute, sublicense,
    and/or sell copies of the Software, and to permit persons to whom the
    Software is furnished to do so, subject to the following conditions:

    The above copyright notice and this permission notice shall be included in
    all copies or substantial portions of the Software.

    THE SOFTWARE IS PROVIDED “AS IS”, WITHOUT WARRANTY OF ANY KIND, EXPRESS OR
    IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF MERCHANTABILITY,
    FITNESS FOR A PARTICULAR PURPOSE AND NONINFRINGEMENT. IN NO EVENT SHALL THE
    AUTHORS OR COPYRIGHT HOLDERS BE LIABLE FOR ANY CLAIM, DAMAGES OR OTHER
    LIABILITY, WHETHER IN AN ACTION OF CONTRACT, TORT OR OTHERWISE, ARISING
    FROM, OUT OF OR IN CONNECTION WITH THE SOFTWARE OR THE USE OR OTHER
    DEALINGS IN THE SOFTWARE.

    --------------------------------------------------------------------------

    demos/tapeinfo/src/main.rs

    This is a simple example of how to use TapeFox to read a CDT tape image and
    print out some basic information about it.
*/
use bpaf::*;

use std::path::PathBuf;
use tapefox::TapeImage;

#[derive(Debug, Clone)]
struct Out {
    check: bool,
    filename: PathBuf,
}

/// Set up bpaf argument parsing.
fn opts() -> OptionParser<Out> {
    let check = short('c').long("check").help("Verify the CRC of every record").switch();

    let filename = short('t')
        .long("filename")
        .help("Filename of tape image to read")
        .argument::<PathBuf>("FILE");

    construct!(Out { check, filename })
        .to_options()
        .descr("tapeinfo: display info about a CDT tape image")
}

fn main() {
    env_logger::init();

    // Get the command line options.
    let opts = opts().run();

    let tape = match TapeImage::load(&opts.filename) {
        Ok(tape) => tape,
        Err(e) => {
            eprintln!("Error loading tape image: {}", e);
            std::process::exit(1);
        }
    };
    log::debug!("Loaded {} blocks from {}", tape.blocks().len(), opts.filename.display());

    println!("Tape image info:");
    println!("----------------");
    let _ = tape.dump_info(&mut std::io::stdout());

    if opts.check {
        println!();
        match tape.check() {
            Ok(()) => println!("All records verified."),
            Err(e) => {
                println!("Check failed: {}", e);
                std::process::exit(1);
            }
        }
    }
}
