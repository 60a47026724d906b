//! Predict sales for one product/outlet record.
//!
//! The model loads before any input is collected: when the artifact is
//! missing or corrupt there is nothing to predict with, so the command
//! reports the load failure and never enters the form.

use std::fmt::Display;
use std::io::{self, BufRead, Write};
use std::path::Path;
use std::str::FromStr;

use clap::Args;
use colored::Colorize;

use pronosticar::encoding::{CodeTable, ITEM_FAT_CONTENT, OUTLET_LOCATION_TYPE, OUTLET_SIZE};
use pronosticar::features::FeatureRecord;
use pronosticar::gateway::{predict, ModelGateway};
use pronosticar::report;

use crate::error::Result;
use crate::output;

/// Record fields as flags, defaulting to the stock form values.
#[derive(Args, Debug)]
pub(crate) struct RecordArgs {
    /// Numeric product identifier
    #[arg(long, default_value_t = FeatureRecord::default().item_identifier)]
    item_identifier: u32,

    /// Product weight in kilograms (1.0 to 50.0)
    #[arg(long, default_value_t = FeatureRecord::default().item_weight)]
    item_weight: f32,

    /// Fat content label: "Low Fat", "Regular", or "High"
    #[arg(long, default_value_t = FeatureRecord::default().item_fat_content)]
    item_fat_content: String,

    /// Display-area fraction (0.0 to 1.0)
    #[arg(long, default_value_t = FeatureRecord::default().item_visibility)]
    item_visibility: f32,

    /// Product category code (0 to 50)
    #[arg(long, default_value_t = FeatureRecord::default().item_type)]
    item_type: u32,

    /// Maximum retail price (1.0 to 5000.0)
    #[arg(long, default_value_t = FeatureRecord::default().item_mrp)]
    item_mrp: f32,

    /// Numeric outlet identifier
    #[arg(long, default_value_t = FeatureRecord::default().outlet_identifier)]
    outlet_identifier: u32,

    /// Year the outlet opened (1900 to 2025)
    #[arg(long, default_value_t = FeatureRecord::default().outlet_establishment_year)]
    outlet_establishment_year: u32,

    /// Outlet size label: "Small", "Medium", "High", or "Other"
    #[arg(long, default_value_t = FeatureRecord::default().outlet_size)]
    outlet_size: String,

    /// Location tier label: "Tier 1", "Tier 2", or "Tier 3"
    #[arg(long, default_value_t = FeatureRecord::default().outlet_location_type)]
    outlet_location_type: String,

    /// Outlet kind code (0 to 10)
    #[arg(long, default_value_t = FeatureRecord::default().outlet_type)]
    outlet_type: u32,
}

impl RecordArgs {
    fn to_record(&self) -> FeatureRecord {
        FeatureRecord {
            item_identifier: self.item_identifier,
            item_weight: self.item_weight,
            item_fat_content: self.item_fat_content.clone(),
            item_visibility: self.item_visibility,
            item_type: self.item_type,
            item_mrp: self.item_mrp,
            outlet_identifier: self.outlet_identifier,
            outlet_establishment_year: self.outlet_establishment_year,
            outlet_size: self.outlet_size.clone(),
            outlet_location_type: self.outlet_location_type.clone(),
            outlet_type: self.outlet_type,
        }
    }
}

pub(crate) fn run(model_path: &Path, interactive: bool, args: &RecordArgs, quiet: bool) -> Result<()> {
    let gateway = ModelGateway::new();
    let model = match gateway.load(model_path) {
        Ok(model) => model,
        Err(e) => {
            output::info(&report::failure_line(&e));
            return Err(e.into());
        }
    };

    let record = if interactive {
        prompt_record(&args.to_record())?
    } else {
        args.to_record()
    };

    let vector = record.encode()?;
    let sales = predict(model.as_ref(), &vector)?;

    if quiet {
        println!("{}", report::format_currency(sales));
        return Ok(());
    }

    output::success("Prediction complete");
    println!("\n{}", report::headline(sales).green().bold());

    output::section("Input Summary");
    for (name, value) in report::summary(&record) {
        output::kv(name, value);
    }
    Ok(())
}

/// Walks the form in the original order: product fields, then outlet fields.
/// An empty line keeps the bracketed default.
fn prompt_record(defaults: &FeatureRecord) -> Result<FeatureRecord> {
    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();

    output::section("Product details");
    let item_identifier = ask(&mut lines, "Item Identifier", defaults.item_identifier)?;
    let item_weight = ask(&mut lines, "Item Weight (kg)", defaults.item_weight)?;
    let item_visibility = ask(&mut lines, "Item Visibility", defaults.item_visibility)?;
    let item_type = ask(&mut lines, "Item Type code", defaults.item_type)?;
    let item_mrp = ask(&mut lines, "Item MRP", defaults.item_mrp)?;
    let item_fat_content = ask_label(
        &mut lines,
        "Item Fat Content",
        &defaults.item_fat_content,
        &ITEM_FAT_CONTENT,
    )?;

    output::section("Outlet details");
    let outlet_identifier = ask(&mut lines, "Outlet Identifier", defaults.outlet_identifier)?;
    let outlet_size = ask_label(&mut lines, "Outlet Size", &defaults.outlet_size, &OUTLET_SIZE)?;
    let outlet_establishment_year = ask(
        &mut lines,
        "Outlet Establishment Year",
        defaults.outlet_establishment_year,
    )?;
    let outlet_location_type = ask_label(
        &mut lines,
        "Outlet Location Type",
        &defaults.outlet_location_type,
        &OUTLET_LOCATION_TYPE,
    )?;
    let outlet_type = ask(&mut lines, "Outlet Type code", defaults.outlet_type)?;

    Ok(FeatureRecord {
        item_identifier,
        item_weight,
        item_fat_content,
        item_visibility,
        item_type,
        item_mrp,
        outlet_identifier,
        outlet_establishment_year,
        outlet_size,
        outlet_location_type,
        outlet_type,
    })
}

/// Prompts for a numeric field until a line parses. Empty input or end of
/// input keeps the default.
fn ask<T, L>(lines: &mut L, label: &str, default: T) -> Result<T>
where
    T: FromStr + Display,
    T::Err: Display,
    L: Iterator<Item = io::Result<String>>,
{
    loop {
        print!("{label} [{default}]: ");
        io::stdout().flush()?;
        let Some(line) = lines.next() else {
            println!();
            return Ok(default);
        };
        let line = line?;
        let trimmed = line.trim();
        if trimmed.is_empty() {
            return Ok(default);
        }
        match trimmed.parse::<T>() {
            Ok(value) => return Ok(value),
            Err(e) => output::warning(&format!("not a valid {label}: {e}")),
        }
    }
}

/// Prompts for a label field until the input is in the table. Empty input
/// or end of input keeps the default.
fn ask_label<L>(lines: &mut L, label: &str, default: &str, table: &CodeTable) -> Result<String>
where
    L: Iterator<Item = io::Result<String>>,
{
    let options = table.labels().join(", ");
    loop {
        print!("{label} [{default}] ({options}): ");
        io::stdout().flush()?;
        let Some(line) = lines.next() else {
            println!();
            return Ok(default.to_string());
        };
        let line = line?;
        let trimmed = line.trim();
        if trimmed.is_empty() {
            return Ok(default.to_string());
        }
        if table.code(trimmed).is_ok() {
            return Ok(trimmed.to_string());
        }
        output::warning(&format!("accepted labels: {options}"));
    }
}
