//! CLI smoke entry point.
//!
//! # Responsibility
//! - Verify `tracker_core` linkage with `ping` / `version` output.
//! - Run an in-memory create/reorder/record pass and print the ordered
//!   result, one line per row.
//!
//! Logging goes to stderr unless `TRACKER_LOG_DIR` names an absolute
//! directory; `TRACKER_LOG_LEVEL` overrides the level.

use log::warn;
use std::error::Error;
use tracker_core::{
    init_logging, open_db_in_memory, LogConfig, NewObject, NewProperty, ObjectService,
    PropertyService, PropertyType, PropertyValue, SqliteObjectRepository,
    SqlitePropertyRepository,
};

fn main() {
    match LogConfig::from_env() {
        Ok(config) => {
            if let Err(err) = init_logging(&config) {
                eprintln!("tracker: logging disabled: {err}");
            }
        }
        Err(err) => eprintln!("tracker: logging disabled: {err}"),
    }

    println!("tracker_core ping={}", tracker_core::ping());
    println!("tracker_core version={}", tracker_core::core_version());

    if let Err(err) = run_demo() {
        warn!("event=cli_demo module=cli status=error error={err}");
        eprintln!("tracker: demo failed: {err}");
        std::process::exit(1);
    }
}

fn run_demo() -> Result<(), Box<dyn Error>> {
    let conn = open_db_in_memory()?;
    let objects = ObjectService::new(SqliteObjectRepository::try_new(&conn)?);
    let properties = PropertyService::new(SqlitePropertyRepository::try_new(&conn)?);

    let mut ids = Vec::new();
    for name in ["Plant", "Bike", "Passport"] {
        let object = objects.create_object(NewObject {
            name: name.to_string(),
            ..NewObject::default()
        })?;
        ids.push(object.uuid);
    }

    // Drag "Passport" to the top.
    ids.rotate_right(1);
    objects.reorder_objects(&ids)?;

    let plant = ids[1];
    properties.add_property(
        plant,
        NewProperty {
            name: "Height".to_string(),
            kind: PropertyType::Integer,
            value: Some(PropertyValue::Integer(30)),
            user_timestamp: None,
        },
    )?;
    properties.record_value(plant, "Height", Some(PropertyValue::Integer(34)), None)?;

    for object in objects.list_objects()? {
        println!(
            "object name={} order={}",
            object.name,
            object.sort_order.as_deref().unwrap_or("-")
        );
        for property in properties.list_properties(object.uuid)? {
            println!(
                "  property name={} value={}",
                property.name,
                property.display_value().unwrap_or_default()
            );
        }
    }
    Ok(())
}
