//! Table rendering for CLI listings.

use comfy_table::modifiers::UTF8_ROUND_CORNERS;
use comfy_table::presets::UTF8_FULL_CONDENSED;
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};

use stockroom_core::{DashboardStats, LOW_STOCK_THRESHOLD};
use stockroom_model::{DatabaseState, Material, Request, RequestStatus, User};

pub fn apply_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic);
}

fn header_cell(text: &str) -> Cell {
    Cell::new(text).add_attribute(Attribute::Bold)
}

fn align_column(table: &mut Table, index: usize, alignment: CellAlignment) {
    if let Some(column) = table.column_mut(index) {
        column.set_cell_alignment(alignment);
    }
}

fn stock_cell(stock: u32) -> Cell {
    if stock < LOW_STOCK_THRESHOLD {
        Cell::new(stock).fg(Color::Red)
    } else {
        Cell::new(stock)
    }
}

fn status_cell(status: RequestStatus) -> Cell {
    let cell = Cell::new(status.as_str());
    match status {
        RequestStatus::Pending => cell.fg(Color::Yellow),
        RequestStatus::Approved => cell.fg(Color::Green),
        RequestStatus::Issued => cell.fg(Color::Cyan),
        RequestStatus::Rejected => cell.fg(Color::Red),
    }
}

pub fn material_table(materials: &[&Material]) -> Table {
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("ID"),
        header_cell("Name"),
        header_cell("Stock"),
        header_cell("Unit"),
    ]);
    apply_table_style(&mut table);
    align_column(&mut table, 0, CellAlignment::Right);
    align_column(&mut table, 2, CellAlignment::Right);
    for material in materials {
        table.add_row(vec![
            Cell::new(material.id),
            Cell::new(&material.name),
            stock_cell(material.stock),
            Cell::new(&material.unit),
        ]);
    }
    table
}

pub fn user_table(users: &[User]) -> Table {
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("ID"),
        header_cell("Username"),
        header_cell("Name"),
        header_cell("Department"),
        header_cell("Role"),
    ]);
    apply_table_style(&mut table);
    align_column(&mut table, 0, CellAlignment::Right);
    for user in users {
        let role_cell = if user.is_admin() {
            Cell::new(user.role.as_str()).fg(Color::Magenta)
        } else {
            Cell::new(user.role.as_str())
        };
        table.add_row(vec![
            Cell::new(user.id),
            Cell::new(&user.username),
            Cell::new(&user.name),
            Cell::new(&user.department),
            role_cell,
        ]);
    }
    table
}

/// Request listing with user and material details joined in. Dangling
/// references render as "Unknown"/"-", matching the export.
pub fn request_table(requests: &[&Request], state: &DatabaseState) -> Table {
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("ID"),
        header_cell("User"),
        header_cell("Department"),
        header_cell("Material"),
        header_cell("Qty"),
        header_cell("Unit"),
        header_cell("Date"),
        header_cell("Status"),
    ]);
    apply_table_style(&mut table);
    align_column(&mut table, 0, CellAlignment::Right);
    align_column(&mut table, 4, CellAlignment::Right);
    for request in requests {
        let user = state.user(request.user_id);
        let material = state.material(request.material_id);
        table.add_row(vec![
            Cell::new(request.id),
            Cell::new(user.map_or("Unknown", |u| u.name.as_str())),
            Cell::new(user.map_or("-", |u| u.department.as_str())),
            Cell::new(material.map_or("Unknown", |m| m.name.as_str())),
            Cell::new(request.quantity),
            Cell::new(material.map_or("-", |m| m.unit.as_str())),
            Cell::new(request.request_date.format("%Y-%m-%d")),
            status_cell(request.status),
        ]);
    }
    table
}

pub fn print_dashboard(stats: &DashboardStats, materials: &[&Material]) {
    println!("Materials: {}", stats.material_count);
    println!("Pending requests: {}", stats.pending_requests);
    println!(
        "Low stock (below {}): {}",
        LOW_STOCK_THRESHOLD, stats.low_stock_materials
    );
    println!("{}", material_table(materials));
}
