use anyhow::{bail, Context};
use clap::Parser;
use pb2int16::tensor::{shape_elements, DataType, TensorProto};
use prost::Message;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "make_tensor", about = "Encode a FLOAT TensorProto from values given on the command line")]
struct Args {
    /// Output .pb file
    out: PathBuf,
    /// Comma separated dims; defaults to a 1-D tensor of all values
    #[arg(long, value_delimiter = ',')]
    dims: Option<Vec<i64>>,
    #[arg(long, default_value = "")]
    name: String,
    /// Store values in raw_data instead of float_data
    #[arg(long)]
    raw: bool,
    #[arg(allow_negative_numbers = true)]
    values: Vec<f32>,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let a = Args::parse();
    let dims = a.dims.unwrap_or_else(|| vec![a.values.len() as i64]);
    let n = shape_elements(&dims)?;
    if n != a.values.len() {
        bail!("dims {:?} need {} values, got {}", dims, n, a.values.len());
    }
    let mut t = TensorProto { dims, data_type: DataType::Float.as_i32(), name: a.name, ..Default::default() };
    if a.raw {
        t.raw_data = a.values.iter().flat_map(|v| v.to_le_bytes()).collect();
    } else {
        t.float_data = a.values;
    }
    std::fs::write(&a.out, t.encode_to_vec()).with_context(|| format!("write tensor: {}", a.out.display()))?;
    log::info!("encoded {} values into {}", n, a.out.display());
    println!("created {}", a.out.display());
    Ok(())
}
