//! Turns raw instance descriptors into ordered, uniquely named ssh targets.
//!
//! Pipeline: drop instances without a usable address, derive a base name,
//! sort by `(base_name, launch_time)`, index runs of equal names, then
//! append the index unless the instance id already appears in the name.

use crate::config::SyncConfig;
use crate::models::{LoginTarget, RawInstance};

pub fn derive(config: &SyncConfig, region: &str, instances: Vec<RawInstance>) -> Vec<LoginTarget> {
    let mut targets: Vec<LoginTarget> = instances
        .into_iter()
        .filter_map(|raw| {
            let address = config.address.select(&raw)?.to_string();
            Some(LoginTarget {
                base_name: base_name(config, region, &raw),
                id: raw.instance_id,
                launch_time: raw.launch_time,
                name_index: 0,
                display_name: String::new(),
                address,
                connection: config.connection.clone(),
            })
        })
        .collect();

    // Stable: equal (name, launch time) pairs keep their API order.
    targets.sort_by(|a, b| {
        a.base_name
            .cmp(&b.base_name)
            .then_with(|| a.launch_time.cmp(&b.launch_time))
    });

    let mut prev: Option<(String, usize)> = None;
    for target in &mut targets {
        target.name_index = match &prev {
            Some((name, index)) if *name == target.base_name => index + 1,
            _ => 0,
        };
        prev = Some((target.base_name.clone(), target.name_index));

        target.display_name = if target.base_name.contains(&target.id) {
            target.base_name.clone()
        } else {
            format!("{}{}", target.base_name, target.name_index)
        };
    }

    tracing::debug!(region, targets = targets.len(), "derived targets");
    targets
}

fn base_name(config: &SyncConfig, region: &str, raw: &RawInstance) -> String {
    let mut name = raw.name_tag().unwrap_or(&raw.instance_id).to_string();
    if config.region_prefix {
        name = format!("{}-{}", region, name);
    }
    if let Some(prefix) = &config.name_prefix {
        name = format!("{}{}", prefix, name);
    }
    name
}
