use base64::prelude::*;
use serde_json::{Map, Value};
use std::fs;

use crate::cli::VmCommands;
use crate::client::{parse_tags, CreateVmImageRequest, CreateVmRequest, Session};
use crate::error::CliResult;
use crate::output::{print_json, print_table, OutputFormat};
use crate::table::{ColumnSpec, RenderSpec};

const VM_COLUMNS: RenderSpec = RenderSpec {
    columns: &[
        ("Name", ColumnSpec::Key("name")),
        ("Vm Id", ColumnSpec::Key("instance_id")),
        ("Instance Size", ColumnSpec::Key("size")),
        ("State", ColumnSpec::Path(&["state", "state"])),
        ("IP", ColumnSpec::Key("ip")),
        ("Image", ColumnSpec::Key("image")),
        ("Created", ColumnSpec::Key("created")),
    ],
    wide_columns: &[],
};

pub fn handle_vm_command(cmd: &VmCommands, session: &Session) -> CliResult<()> {
    match cmd {
        VmCommands::Describe { vm_id, output, wide } => {
            let records = session.vm().describe(vm_id)?;
            print_vms(&records, session.format(*output), *wide)?;
        }

        VmCommands::DescribeAll { output, wide } => {
            let records = session.vm().describe_all()?;
            print_vms(&records, session.format(*output), *wide)?;
        }

        VmCommands::Create {
            image_id,
            volume_id,
            instance_size,
            network_profile,
            private_ip,
            key_name,
            disk_size,
            disk_image_id,
            user_data_file,
            enable_vnc,
            vnc_port,
            name,
            tags,
        } => {
            let mut tags = parse_tags(tags);
            if let Some(name) = name {
                tags.insert("Name".to_string(), Value::String(name.clone()));
            }

            let user_data = match user_data_file.as_deref() {
                Some(path) => Some(read_user_data(path)?),
                None => None,
            };

            let request = CreateVmRequest {
                image_id: image_id.clone(),
                volume_id: volume_id.clone(),
                instance_size: instance_size.clone(),
                network_profile: network_profile.clone(),
                private_ip: private_ip.clone(),
                key_name: key_name.clone(),
                disk_size: disk_size.clone(),
                disk_image_id: disk_image_id.clone(),
                enable_vnc: *enable_vnc,
                vnc_port: vnc_port.clone(),
                user_data,
                tags,
            };

            let response = session.vm().create(&request)?;
            print_json(&response)?;
        }

        VmCommands::Start { vm_id } => {
            let response = session.vm().start(vm_id)?;
            print_json(&response)?;
        }

        VmCommands::Stop { vm_id } => {
            let response = session.vm().stop(vm_id)?;
            print_json(&response)?;
        }

        VmCommands::Terminate { vm_id } => {
            let response = session.vm().terminate(vm_id)?;
            print_json(&response)?;
        }

        VmCommands::CreateImage {
            vm_id,
            name,
            description,
        } => {
            let request = CreateVmImageRequest {
                name: name.clone(),
                description: description.clone(),
            };
            let response = session.vm().create_image(vm_id, &request)?;
            print_json(&response)?;
        }
    }
    Ok(())
}

fn print_vms(records: &[Value], output: OutputFormat, wide: bool) -> CliResult<()> {
    match output {
        OutputFormat::Table => print_table(&vm_table_records(records), &VM_COLUMNS, wide),
        OutputFormat::Json => print_json(&records)?,
    }
    Ok(())
}

// Cloud-init payloads travel base64 encoded.
fn read_user_data(path: &str) -> CliResult<String> {
    let contents = fs::read(path)?;
    Ok(BASE64_STANDARD.encode(contents))
}

// The table view flattens fields the API nests. Only record copies are
// touched; json output always shows the records as received.
fn vm_table_records(records: &[Value]) -> Vec<Value> {
    records
        .iter()
        .cloned()
        .map(|mut record| {
            if let Some(vm) = record.as_object_mut() {
                let name = tag_name(vm);
                let size = combined_size(vm);
                let ip = launch_ip(vm);
                let image = image_display(vm);
                vm.insert("name".to_string(), Value::String(name));
                vm.insert("size".to_string(), Value::String(size));
                vm.insert("ip".to_string(), Value::String(ip));
                vm.insert("image".to_string(), Value::String(image));
            }
            record
        })
        .collect()
}

fn tag_name(vm: &Map<String, Value>) -> String {
    vm.get("tags")
        .and_then(|tags| tags.get("Name"))
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string()
}

fn combined_size(vm: &Map<String, Value>) -> String {
    match (
        vm.get("instance_type").and_then(Value::as_str),
        vm.get("instance_size").and_then(Value::as_str),
    ) {
        (Some(family), Some(size)) => format!("{}.{}", family, size),
        _ => String::new(),
    }
}

fn launch_ip(vm: &Map<String, Value>) -> String {
    vm.get("interfaces")
        .and_then(|interfaces| interfaces.get("config_at_launch"))
        .and_then(|config| config.get("private_ip"))
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string()
}

fn image_display(vm: &Map<String, Value>) -> String {
    let metadata = match vm.get("image_metadata") {
        Some(Value::Object(metadata)) => metadata,
        _ => return String::new(),
    };
    match (
        metadata.get("image_id").and_then(Value::as_str),
        metadata.get("image_name").and_then(Value::as_str),
    ) {
        (Some(id), Some(name)) if !name.is_empty() => format!("{} ({})", id, name),
        (Some(id), _) => id.to_string(),
        _ => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::project;
    use serde_json::json;

    fn sample_vm() -> Value {
        json!({
            "instance_id": "vm-b49c3b",
            "instance_type": "standard",
            "instance_size": "small",
            "state": {"code": 1, "state": "running"},
            "interfaces": {
                "config_at_launch": {
                    "network_profile": "home-lan",
                    "private_ip": "172.16.9.12"
                }
            },
            "image_metadata": {"image_id": "gmi-12345", "image_name": "Ubuntu 20.04"},
            "tags": {"Name": "web1", "env": "prod"},
            "created": "2021-05-04 21:05:11"
        })
    }

    #[test]
    fn test_vm_table_rows() {
        let records = vec![sample_vm()];
        let rows = project(&vm_table_records(&records), &VM_COLUMNS, false);
        assert_eq!(
            rows,
            vec![vec![
                "web1",
                "vm-b49c3b",
                "standard.small",
                "running",
                "172.16.9.12",
                "gmi-12345 (Ubuntu 20.04)",
                "2021-05-04 21:05:11",
            ]]
        );
    }

    #[test]
    fn test_vm_table_handles_missing_fields() {
        let records = vec![json!({"instance_id": "vm-000001"})];
        let rows = project(&vm_table_records(&records), &VM_COLUMNS, false);
        assert_eq!(rows, vec![vec!["", "vm-000001", "", "", "", "", ""]]);
    }

    #[test]
    fn test_table_enrichment_leaves_input_untouched() {
        let records = vec![sample_vm()];
        let _ = vm_table_records(&records);
        assert_eq!(records[0], sample_vm());
    }
}
