use comfy_table::{Cell, CellAlignment, Table, presets::UTF8_FULL};
use courier_optimizer::session::summary::SolutionSummary;

fn kilometers(meters: i64) -> String {
    format!("{:.1}", meters as f64 / 1000.0)
}

pub fn summary_table(summary: &SolutionSummary) -> Table {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL).set_header(vec![
        "Vehicle",
        "Stops",
        "Done",
        "Deliveries",
        "Pickups",
        "Available",
        "Km",
        "Back at",
    ]);

    for vehicle in &summary.vehicles {
        table.add_row(vec![
            Cell::new(&vehicle.external_id),
            Cell::new(vehicle.stops).set_alignment(CellAlignment::Right),
            Cell::new(vehicle.completed_stops).set_alignment(CellAlignment::Right),
            Cell::new(vehicle.deliveries).set_alignment(CellAlignment::Right),
            Cell::new(vehicle.pickups).set_alignment(CellAlignment::Right),
            Cell::new(vehicle.available_capacity).set_alignment(CellAlignment::Right),
            Cell::new(kilometers(vehicle.distance)).set_alignment(CellAlignment::Right),
            Cell::new(
                vehicle
                    .return_time
                    .map(|time| time.strftime("%H:%M").to_string())
                    .unwrap_or_else(|| "-".to_owned()),
            ),
        ]);
    }

    table
}

pub fn print_summary(title: &str, summary: &SolutionSummary) {
    println!("{title}");
    println!("{}", summary_table(summary));
    println!(
        "state = {}, routes = {}, postponed = {}, distance = {} km, objective = {}",
        summary.state,
        summary.vehicles.len(),
        summary.dropped.len(),
        kilometers(summary.total_distance),
        summary
            .objective
            .map(|objective| objective.to_string())
            .unwrap_or_else(|| "-".to_owned()),
    );
}
