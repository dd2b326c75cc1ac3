use crate::support::{print_json, yes_no};
use serde_json::json;
use sitekit_job::{REQUIRED_LOCATION_TYPES, create_site_form};

pub fn run(json_output: bool) {
    let form = create_site_form();

    if json_output {
        print_json(&json!({
            "action": "describe",
            "job": form.job,
            "fields": form.fields,
            "requiredLocationTypes": REQUIRED_LOCATION_TYPES
                .iter()
                .map(|(name, parent)| json!({ "name": name, "parent": parent }))
                .collect::<Vec<_>>(),
        }));
        return;
    }

    println!("{} / {}", form.job.grouping, form.job.name);
    println!();
    println!("  {}", form.job.description);
    println!();
    println!("  fields:");
    for field in &form.fields {
        println!(
            "  - {} ({}, required: {})",
            field.name,
            field.label,
            yes_no(field.required)
        );
        if !field.choices.is_empty() {
            println!("      choices: {}", field.choices.join(", "));
        }
        if let Some(description) = field.description {
            println!("      {description}");
        }
    }
}
