use clap::{ Arg, App };
use env_logger::Env;
use log::{ error, info };

use std::error::Error;
use std::path::PathBuf;
use std::process;

use plate_recognizer::config::{ OcrConfig, PipelineConfig };
use plate_recognizer::ocr::TesseractCli;
use plate_recognizer::store::{ DEFAULT_RESULT_TABLE, DEFAULT_SOURCE_TABLE };
use plate_recognizer::{ BatchRunner, BatchSummary, Lpr, RecordSource, ResultPersister, SqliteStore };


fn main() -> Result<(), Box<dyn Error>> {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    let matches = App::new("plate-recognizer")
                    .version("0.1.0")
                    .about("Finds and reads license plates in stored photos")
                    .arg(Arg::with_name("DATABASE")
                        .help("sqlite database holding the photos")
                        .required(true)
                        .index(1))
                    .arg(Arg::with_name("source-table")
                        .long("source-table")
                        .takes_value(true)
                        .default_value(DEFAULT_SOURCE_TABLE)
                        .help("table with id, plate_image, plate_number columns"))
                    .arg(Arg::with_name("result-table")
                        .long("result-table")
                        .takes_value(true)
                        .default_value(DEFAULT_RESULT_TABLE))
                    .arg(Arg::with_name("tesseract")
                        .long("tesseract")
                        .takes_value(true)
                        .default_value("tesseract")
                        .help("tesseract executable"))
                    .arg(Arg::with_name("workers")
                        .long("workers")
                        .short("j")
                        .takes_value(true)
                        .default_value("1"))
                    .arg(Arg::with_name("dry-run")
                        .long("dry-run")
                        .help("print results without writing them back"))
                    .get_matches();

    let db = matches.value_of("DATABASE").ok_or("database is required")?;
    let source_table = matches.value_of("source-table").unwrap_or(DEFAULT_SOURCE_TABLE);
    let result_table = matches.value_of("result-table").unwrap_or(DEFAULT_RESULT_TABLE);
    let workers: usize = matches.value_of("workers").unwrap_or("1").parse()?;

    let ocr_config = OcrConfig {
        tesseract_bin: PathBuf::from(matches.value_of("tesseract").unwrap_or("tesseract")),
        ..Default::default()
    };
    let lpr = Lpr::new(&PipelineConfig::default(), &ocr_config, TesseractCli::new(&ocr_config))?;
    let runner = BatchRunner::new(lpr);

    let mut store = SqliteStore::open(db, source_table, result_table)?;
    let records = store.fetch_records(source_table)?;
    info!("running {} records on {} worker(s)", records.len(), workers);

    let results = if workers > 1 {
        runner.run_parallel(&records, workers)?
    } else {
        runner.run(&records)
    };

    for result in &results {
        println!("{}", result);
    }
    println!("{}", BatchSummary::from_results(&results));

    if matches.is_present("dry-run") {
        return Ok(());
    }
    match store.persist(&results) {
        Ok(count) => info!("saved {} results to {}", count, result_table),
        Err(e) => {
            error!("saving results failed, nothing was written: {}", e);
            process::exit(1);
        }
    }
    Ok(())
}
