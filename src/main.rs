use std::path::PathBuf;

use structopt::StructOpt;

use chasm::codegen::EmitOptions;
use chasm::error::SourceMetadata;

use tracing_subscriber::fmt;

fn main() {
    if let Err(ref e) = run() {
        eprintln!("{}", e);
        std::process::exit(1);
    }
}

fn run() -> Result<(), anyhow::Error> {
    use std::fs;

    let opt = Opt::from_args();

    if let Some((_, filter)) = std::env::vars().find(|x| x.0 == "CHASM_TRACE") {
        tracing_log::LogTracer::init()?;
        let subscriber = fmt::Subscriber::builder()
            .with_ansi(true)
            .pretty()
            .with_env_filter(filter)
            .finish();
        tracing::subscriber::set_global_default(subscriber)?;
    }

    let filename = opt.file;
    let source = fs::read_to_string(&filename)?;
    let out_file = opt
        .output
        .unwrap_or_else(|| filename.with_extension("wasm"));
    let meta = SourceMetadata::new(&source).with_file(filename);
    let options = EmitOptions {
        strict_variables: opt.strict,
    };

    let module = chasm::compile_with(&meta, options)?;

    log::debug!("writing {} bytes to {}", module.len(), out_file.display());
    fs::write(&out_file, &module)?;

    if opt.dump {
        println!("{}", chasm::hexdump::hexdump(&module, opt.ascii));
    }

    Ok(())
}

#[derive(Debug, StructOpt)]
#[structopt(name = "chasm", about = "Compiles chasm scripts to WebAssembly modules")]
struct Opt {
    /// The file to compile
    #[structopt(parse(from_os_str))]
    file: PathBuf,
    /// The (optional) output file, defaults to the input with a `.wasm` extension
    #[structopt(short = "o", long = "output", parse(from_os_str))]
    output: Option<PathBuf>,
    /// Print a hex dump of the generated module
    #[structopt(short = "d", long = "dump")]
    dump: bool,
    /// Show printable characters next to the hex dump
    #[structopt(long = "ascii")]
    ascii: bool,
    /// Reject variables that are read or assigned before their `var` declaration
    #[structopt(long = "strict")]
    strict: bool,
}
