use inductive_miner::{
    discover, import_uvcl_json_from_path, model_to_petri_net, InductiveMinerConfig,
    InductiveMinerVariant,
};
use std::env;
use std::error::Error;
use std::path::PathBuf;

fn main() -> Result<(), Box<dyn Error>> {
    let args: Vec<String> = env::args().collect();
    if args.len() < 3 || args.len() > 4 {
        eprintln!(
            "Usage: {} <path_to_log.json> <output_pnml_path> [variant]",
            args[0]
        );
        std::process::exit(1);
    }

    let input_path = PathBuf::from(&args[1]);
    let output_path = PathBuf::from(&args[2]);
    let variant: InductiveMinerVariant = match args.get(3) {
        Some(v) => v.parse()?,
        None => InductiveMinerVariant::IM,
    };

    println!("Importing log from {:?}", input_path);
    let log = import_uvcl_json_from_path(&input_path)?;

    println!("Discovering model using {}...", variant);
    let model = discover(&log, &InductiveMinerConfig::for_variant(variant))?;
    println!("{}", model);

    let (petri_net, _, _) = model_to_petri_net(&model)?;
    println!(
        "Converted to Petri net with {} places and {} transitions.",
        petri_net.places.len(),
        petri_net.transitions.len()
    );

    println!("Exporting Petri net to {:?}", output_path);
    petri_net.export_pnml(&output_path)?;

    println!("Done!");
    Ok(())
}
