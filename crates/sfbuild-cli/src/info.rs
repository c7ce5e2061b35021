// Copyright (c) sfbuild contributors
// SPDX-License-Identifier: Apache-2.0

use colored::Colorize;
use sfbuild_catalog::Catalog;

/// Print every produced artifact across all stages, with its producing
/// stage and `meta` description. A stage that left an artifact's `meta`
/// entry unset prints an empty description rather than omitting the row.
///
/// Rows are sorted by artifact name for reproducible output, matching
/// `sfbuild_plan::render::describe`'s ordering.
pub fn print(catalog: &Catalog) {
    println!("Platform dependencies/targets:");

    let mut rows: Vec<(&str, &str, Option<&str>)> = catalog
        .stages
        .iter()
        .flat_map(|stage| {
            stage
                .produces
                .iter()
                .map(move |output| (output.name.as_str(), stage.name.as_str(), stage.meta.get(&output.name).map(String::as_str)))
        })
        .collect();
    rows.sort_by_key(|(name, _, _)| *name);

    let desc_indent = rows.iter().map(|(name, _, _)| name.len()).max().unwrap_or(0) + 7;
    for (name, stage_name, desc) in rows {
        let desc = desc.unwrap_or_default();
        let padding = " ".repeat(desc_indent.saturating_sub(name.len() + 4));
        let nl_indent = "\n".to_owned() + &" ".repeat(desc_indent);
        let desc = desc.replace('\n', &nl_indent);
        println!(
            "    {}:{}{}{}module: `{}`",
            name.bold(),
            padding,
            desc,
            nl_indent,
            stage_name.dimmed(),
        );
    }
}
