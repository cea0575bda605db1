use clap::{Arg, Command};
use std::fs;
use std::path::Path;
use well_to_midi_core::{
    sonify_readings, Aggregation, CsvColumns, DistanceUnit, SonificationConfig,
};

fn main() -> anyhow::Result<()> {
    let matches = Command::new("well-to-midi")
        .version("0.1.0")
        .about("Sonify groundwater depth readings as falling and splashing MIDI notes")
        .arg(
            Arg::new("input")
                .short('i')
                .long("input")
                .value_name("FILE")
                .help("Input CSV file path")
                .required(true),
        )
        .arg(
            Arg::new("output")
                .short('o')
                .long("output")
                .value_name("FILE")
                .help("Output MIDI file path")
                .required(true),
        )
        .arg(
            Arg::new("date-column")
                .long("date-column")
                .value_name("NAME")
                .help("Header name of the date column (default: date)")
                .default_value("date"),
        )
        .arg(
            Arg::new("date-format")
                .long("date-format")
                .value_name("FORMAT")
                .help("strftime format of the date column (default: %Y-%m-%d)")
                .default_value("%Y-%m-%d"),
        )
        .arg(
            Arg::new("distance-column")
                .long("distance-column")
                .value_name("NAME")
                .help("Header name of the depth column (default: depth_to_water_feet)")
                .default_value("depth_to_water_feet"),
        )
        .arg(
            Arg::new("unit")
                .short('u')
                .long("unit")
                .value_name("UNIT")
                .help("Unit of the depth column: feet or meters (default: feet)")
                .default_value("feet"),
        )
        .arg(
            Arg::new("aggregate")
                .short('a')
                .long("aggregate")
                .value_name("MODE")
                .help("Bucket readings before mapping: none, yearly or decade (default: none)")
                .default_value("none"),
        )
        .arg(
            Arg::new("tempo")
                .short('t')
                .long("tempo")
                .value_name("BPM")
                .help("Tempo in beats per minute (default: 120)")
                .default_value("120"),
        )
        .arg(
            Arg::new("seconds-per-year")
                .long("seconds-per-year")
                .value_name("SECONDS")
                .help("Seconds of music per year of data (default: 5)")
                .default_value("5"),
        )
        .arg(
            Arg::new("base-octave")
                .long("base-octave")
                .value_name("OCTAVE")
                .help("Lowest octave of the splash pitch range (default: 3)")
                .default_value("3"),
        )
        .arg(
            Arg::new("octave-range")
                .long("octave-range")
                .value_name("COUNT")
                .help("Octaves spanned by the splash pitch range (default: 3)")
                .default_value("3"),
        )
        .get_matches();

    let input_path = matches.get_one::<String>("input").unwrap();
    let output_path = matches.get_one::<String>("output").unwrap();
    let date_column = matches.get_one::<String>("date-column").unwrap();
    let date_format = matches.get_one::<String>("date-format").unwrap();
    let distance_column = matches.get_one::<String>("distance-column").unwrap();

    let tempo: f64 = matches
        .get_one::<String>("tempo")
        .unwrap()
        .parse()
        .map_err(|_| anyhow::anyhow!("Invalid tempo"))?;

    let seconds_per_year: f64 = matches
        .get_one::<String>("seconds-per-year")
        .unwrap()
        .parse()
        .map_err(|_| anyhow::anyhow!("Invalid seconds per year"))?;

    let base_octave: u8 = matches
        .get_one::<String>("base-octave")
        .unwrap()
        .parse()
        .map_err(|_| anyhow::anyhow!("Invalid base octave"))?;

    let octave_range: u8 = matches
        .get_one::<String>("octave-range")
        .unwrap()
        .parse()
        .map_err(|_| anyhow::anyhow!("Invalid octave range"))?;

    let unit = match matches.get_one::<String>("unit").unwrap().as_str() {
        "feet" | "ft" => DistanceUnit::Feet,
        "meters" | "m" => DistanceUnit::Meters,
        other => return Err(anyhow::anyhow!("Unknown unit: {}", other)),
    };

    let aggregation = match matches.get_one::<String>("aggregate").unwrap().as_str() {
        "none" => Aggregation::None,
        "yearly" | "year" => Aggregation::Yearly,
        "decade" => Aggregation::Decade,
        other => return Err(anyhow::anyhow!("Unknown aggregation mode: {}", other)),
    };

    // Validate input file exists
    if !Path::new(input_path).exists() {
        return Err(anyhow::anyhow!("Input file does not exist: {}", input_path));
    }

    // Validate parameters
    if tempo <= 0.0 {
        return Err(anyhow::anyhow!("Tempo must be positive"));
    }
    if seconds_per_year <= 0.0 {
        return Err(anyhow::anyhow!("Seconds per year must be positive"));
    }
    if octave_range < 1 {
        return Err(anyhow::anyhow!("Octave range must be at least 1"));
    }
    if base_octave as u32 + octave_range as u32 > 8 {
        return Err(anyhow::anyhow!(
            "Base octave plus octave range must stay at or below octave 8"
        ));
    }

    let columns = CsvColumns {
        date_column: date_column.clone(),
        date_format: date_format.clone(),
        distance_column: distance_column.clone(),
        unit,
    };

    let config = SonificationConfig {
        tempo,
        seconds_per_year,
        base_octave,
        octave_range,
        ..SonificationConfig::default()
    };

    println!("Sonifying well readings...");
    println!("Input: {}", input_path);
    println!("Output: {}", output_path);
    println!(
        "Depth column: {} ({})",
        distance_column,
        match unit {
            DistanceUnit::Feet => "feet",
            DistanceUnit::Meters => "meters",
        }
    );
    println!(
        "Tempo: {} BPM, {} seconds per data year",
        tempo, seconds_per_year
    );

    // Read the input CSV file
    let csv_data = fs::read(input_path)
        .map_err(|e| anyhow::anyhow!("Failed to read input file: {}", e))?;

    // Run the pipeline
    let midi_data = sonify_readings(csv_data.as_slice(), &columns, aggregation, &config)
        .map_err(|e| anyhow::anyhow!("Sonification failed: {}", e))?;

    // Write the output MIDI file
    fs::write(output_path, &midi_data)
        .map_err(|e| anyhow::anyhow!("Failed to write output file: {}", e))?;

    println!("Sonification completed successfully!");
    println!("Generated MIDI file: {} ({} bytes)", output_path, midi_data.len());

    Ok(())
}
