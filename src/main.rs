use anyhow::{Context, Result};
use iris_datasets::data::loader::DEFAULT_PATH;
use iris_datasets::load_data;

/// Demo: split the dataset 70/30 and show the training features.
///
/// Usage: `iris-datasets [PATH] [--json]`
fn main() -> Result<()> {
    env_logger::init();

    let mut path = DEFAULT_PATH.to_string();
    let mut json = false;
    for arg in std::env::args().skip(1) {
        match arg.as_str() {
            "--json" => json = true,
            _ => path = arg,
        }
    }

    let Some(data) = load_data(true, Some(0.7), &path)
        .with_context(|| format!("loading dataset from {path}"))?
    else {
        return Ok(());
    };

    if json {
        let text = serde_json::to_string_pretty(&data).context("serializing dataset")?;
        println!("{text}");
        return Ok(());
    }

    println!("{:?}", data.keys());
    if let Some(x_train) = data.get("X_train") {
        println!("Array2<f64> {:?}", x_train.shape());
        println!("{x_train}");
    }
    Ok(())
}
