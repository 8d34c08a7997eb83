use clap::Parser;
use pb2int16::tensor::load_tensor;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "dump_tensor", about = "Print the header and value range of a serialized tensor")]
struct Args {
    input: PathBuf,
    /// Also print every value
    #[arg(long)]
    values: bool,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let a = Args::parse();
    let t = load_tensor(&a.input)?;
    println!("name:     {}", if t.name.is_empty() { "(unnamed)" } else { t.name.as_str() });
    println!("type:     {}", t.dtype);
    println!("dims:     {:?}", t.dims);
    println!("elements: {}", t.element_count());
    match t.value_range() {
        Some((lo, hi)) => println!("range:    [{}, {}]", lo, hi),
        None => println!("range:    (empty)"),
    }
    if a.values {
        for v in &t.values { println!("{}", v); }
    }
    Ok(())
}
