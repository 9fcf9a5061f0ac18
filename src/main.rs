use std::fs::File;
use std::io::{self, Write};
use std::path::PathBuf;
use std::process::exit;

use color_eyre::eyre::{bail, eyre, Result, WrapErr};
use log::{warn, LevelFilter};
use simple_logger::SimpleLogger;

use f100l::{loader, Cpu, Ram, Status};

const USAGE: &str = "\
Usage:
    f100emu -f <filename> [options]

Options:
    -f, --file <filename>   program image file name
    -x, --hex               image is plain hex (default)
    -b, --binary            image is raw binary (big-endian byte pairs)
        --big-endian        big-endian byte pairing for hex images
    -a, --adsel <0|1>       state of the AdSel pin at reset (default 1)
    -n, --max <count>       stop after <count> instructions (default: no limit)
    -d, --dump <filename>   write a hex dump of memory after the run
    -v, --verbose           more logging (-v debug, -vv per-instruction trace)
    -h, --help              print this summary";

struct Args {
    file: PathBuf,
    binary: bool,
    big_endian: bool,
    adsel: bool,
    max_instructions: u64,
    dump: Option<PathBuf>,
    verbosity: u8,
}

fn parse_args() -> Result<Args> {
    let mut file = None;
    let mut binary = false;
    let mut big_endian = false;
    let mut adsel = true;
    let mut max_instructions = 0;
    let mut dump = None;
    let mut verbosity = 0u8;

    let mut args = std::env::args().skip(1);
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "-f" | "--file" => {
                let path = args.next().ok_or_else(|| eyre!("{arg} needs a file name"))?;
                file = Some(PathBuf::from(path));
            }
            "-b" | "--binary" => binary = true,
            "-x" | "--hex" => binary = false,
            "--big-endian" => big_endian = true,
            "-a" | "--adsel" => {
                adsel = match args.next().as_deref() {
                    Some("0") => false,
                    Some("1") => true,
                    other => bail!("-a takes 0 or 1, got {other:?}"),
                };
            }
            "-n" | "--max" => {
                let count = args.next().ok_or_else(|| eyre!("{arg} needs a count"))?;
                max_instructions = count
                    .parse()
                    .wrap_err_with(|| format!("bad instruction count {count:?}"))?;
            }
            "-d" | "--dump" => {
                let path = args.next().ok_or_else(|| eyre!("{arg} needs a file name"))?;
                dump = Some(PathBuf::from(path));
            }
            "-v" | "--verbose" => verbosity += 1,
            "-h" | "--help" => {
                println!("{USAGE}");
                exit(0);
            }
            other => bail!("unknown argument {other:?}\n{USAGE}"),
        }
    }

    let file = file.ok_or_else(|| eyre!("missing -f <filename>\n{USAGE}"))?;
    Ok(Args {
        file,
        binary,
        big_endian,
        adsel,
        max_instructions,
        dump,
        verbosity,
    })
}

fn main() -> Result<()> {
    color_eyre::install()?;
    let args = parse_args()?;

    let level = match args.verbosity {
        0 => LevelFilter::Info,
        1 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };
    SimpleLogger::new().with_level(level).init()?;

    let image = if args.binary {
        loader::read_bin_file(&args.file)
    } else {
        loader::read_hex_file(&args.file, args.big_endian)
    }
    .wrap_err_with(|| format!("cannot read program image {}", args.file.display()))?;

    let mut ram = Ram::default();
    let capacity = ram.words().len();
    if image.len() > capacity {
        warn!(
            "image of {} words truncated to the {} word store",
            image.len(),
            capacity
        );
    }
    let loaded = image.len().min(capacity);
    ram.load(0, &image[..loaded]);

    let mut cpu = Cpu::new(args.adsel);
    let (status, retired) = cpu
        .run(&mut ram, args.max_instructions)
        .wrap_err("execution fault")?;

    match status {
        Status::Halted(number) => {
            println!("CPU halted with halt number 0x{number:04X}");
        }
        Status::Running => {
            println!("instruction limit reached after {retired} instructions");
        }
    }
    println!("instructions executed : {retired}");
    println!("memory reads          : {}", ram.reads());
    println!("memory writes         : {}", ram.writes());

    if let Some(path) = args.dump {
        // Bound the dump to the loaded image plus anything the program
        // touched beyond it.
        let written_top = ram.written_addresses().last().map_or(0, |a| a as usize + 1);
        let top = loaded.max(written_top).min(capacity);
        let rows = top.div_ceil(16) * 16;
        let mut out = io::BufWriter::new(
            File::create(&path)
                .wrap_err_with(|| format!("cannot create dump file {}", path.display()))?,
        );
        loader::write_hex_dump(&mut out, &ram.words()[..rows.min(capacity)])?;
        out.flush()?;
    }
    Ok(())
}
