//! CSV projections of the material and request tables.
//!
//! Exports are pure functions of the collections: fixed column headers, a
//! UTF-8 byte-order mark up front so regional spreadsheet tools pick the
//! right encoding, and "Unknown" placeholders where a request references a
//! since-deleted user or material.

use anyhow::{Context, Result};
use csv::{ReaderBuilder, WriterBuilder};

use stockroom_model::{DatabaseState, EntityId, Material, Request};

/// Prepended to every export for spreadsheet encoding detection.
pub const BOM: &str = "\u{feff}";

pub const MATERIAL_HEADERS: [&str; 4] = ["ID", "Name", "Stock", "Unit"];
pub const REQUEST_HEADERS: [&str; 8] = [
    "ID",
    "User",
    "Department",
    "Material",
    "Quantity",
    "Unit",
    "Date",
    "Status",
];

/// Render materials as CSV text, in the order given.
pub fn materials_csv<'a, I>(materials: I) -> Result<String>
where
    I: IntoIterator<Item = &'a Material>,
{
    let mut writer = WriterBuilder::new().from_writer(Vec::new());
    writer
        .write_record(MATERIAL_HEADERS)
        .context("write material headers")?;
    for material in materials {
        writer
            .write_record([
                material.id.to_string(),
                material.name.clone(),
                material.stock.to_string(),
                material.unit.clone(),
            ])
            .context("write material row")?;
    }
    finish(writer)
}

/// Render requests as CSV text, joining user and material details from the
/// store state. Dangling references come out as "Unknown" (names) or "-"
/// (qualifiers), never as an error.
pub fn requests_csv<'a, I>(requests: I, state: &DatabaseState) -> Result<String>
where
    I: IntoIterator<Item = &'a Request>,
{
    let mut writer = WriterBuilder::new().from_writer(Vec::new());
    writer
        .write_record(REQUEST_HEADERS)
        .context("write request headers")?;
    for request in requests {
        let user = state.user(request.user_id);
        let material = state.material(request.material_id);
        writer
            .write_record([
                request.id.to_string(),
                user.map_or("Unknown".to_string(), |u| u.name.clone()),
                user.map_or("-".to_string(), |u| u.department.clone()),
                material.map_or("Unknown".to_string(), |m| m.name.clone()),
                request.quantity.to_string(),
                material.map_or("-".to_string(), |m| m.unit.clone()),
                request.request_date.format("%Y-%m-%d").to_string(),
                request.status.to_string(),
            ])
            .context("write request row")?;
    }
    finish(writer)
}

/// Read a material export back into records, in file order.
pub fn parse_materials_csv(text: &str) -> Result<Vec<Material>> {
    let body = text.trim_start_matches('\u{feff}');
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .from_reader(body.as_bytes());
    let mut materials = Vec::new();
    for (index, record) in reader.records().enumerate() {
        let record = record.with_context(|| format!("read material row {}", index + 1))?;
        let field = |column: usize| record.get(column).unwrap_or("").trim();
        materials.push(Material {
            id: EntityId(
                field(0)
                    .parse()
                    .with_context(|| format!("parse id in row {}", index + 1))?,
            ),
            name: field(1).to_string(),
            stock: field(2)
                .parse()
                .with_context(|| format!("parse stock in row {}", index + 1))?,
            unit: field(3).to_string(),
        });
    }
    Ok(materials)
}

fn finish(mut writer: csv::Writer<Vec<u8>>) -> Result<String> {
    writer.flush().context("flush csv writer")?;
    let bytes = writer
        .into_inner()
        .map_err(|error| anyhow::anyhow!("finalize csv writer: {}", error.error()))?;
    let body = String::from_utf8(bytes).context("csv output is utf-8")?;
    Ok(format!("{BOM}{body}"))
}
