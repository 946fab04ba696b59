use std::io::{self, Write};

use colored::Colorize;
use comfy_table::presets::UTF8_FULL_CONDENSED;
use comfy_table::{ContentArrangement, Table};
use fzn_sch::bom::collect_parts;
use fzn_sch::{PartInstance, Schematic};

/// Parts by designator, then one line per net.
pub fn write_netlist<W: Write>(schematic: &Schematic, mut writer: W) -> io::Result<()> {
    let mut instances: Vec<&PartInstance> = schematic.instances.values().collect();
    instances.sort_by(|a, b| natord::compare(&a.designator, &b.designator));

    writeln!(writer, "{}", "Parts".bold())?;
    for instance in instances {
        writeln!(
            writer,
            "  {:<6} {}",
            instance.designator,
            instance.part.short_name()
        )?;
    }

    writeln!(writer)?;
    writeln!(writer, "{}", "Nets".bold())?;
    for node in schematic.nodes.values() {
        let pins: Vec<String> = node
            .connections
            .iter()
            .filter_map(|c| schematic.describe(c))
            .collect();
        writeln!(writer, "  {}: {}", node.name(), pins.join(", "))?;
    }
    Ok(())
}

pub fn write_bom_table<W: Write>(schematic: &Schematic, mut writer: W) -> io::Result<()> {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL_CONDENSED);
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec!["Designators", "Qty", "Part", "Description"]);

    for usage in collect_parts(schematic) {
        let description = usage
            .part
            .description()
            .and_then(|d| d.lines().next())
            .unwrap_or_default();
        table.add_row(vec![
            usage.designators().join(","),
            usage.quantity().to_string(),
            usage.part.short_name().to_string(),
            description.to_string(),
        ]);
    }

    writeln!(writer, "{table}")
}
