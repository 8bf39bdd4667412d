use serde_json::{Map, Value};

use crate::cli::NetworkCommands;
use crate::client::{parse_tags, CreateNetworkRequest, Session};
use crate::error::CliResult;
use crate::output::{print_json, print_table, OutputFormat};
use crate::table::{render_value, ColumnSpec, RenderSpec};

const NETWORK_COLUMNS: RenderSpec = RenderSpec {
    columns: &[
        ("Name", ColumnSpec::Key("name")),
        ("Network Id", ColumnSpec::Key("network_id")),
        ("Type", ColumnSpec::Key("type")),
        ("CIDR", ColumnSpec::Key("cidr")),
    ],
    wide_columns: &[
        ("Interface", ColumnSpec::Path(&["config", "bridge_interface"])),
        ("DNS Servers", ColumnSpec::Key("dns_servers")),
    ],
};

pub fn handle_network_command(cmd: &NetworkCommands, session: &Session) -> CliResult<()> {
    match cmd {
        NetworkCommands::Describe {
            network_id,
            output,
            wide,
        } => {
            let records = session.network().describe(network_id)?;
            print_networks(&records, session.format(*output), *wide)?;
        }

        NetworkCommands::DescribeAll { output, wide } => {
            let records = session.network().describe_all()?;
            print_networks(&records, session.format(*output), *wide)?;
        }

        NetworkCommands::Create {
            name,
            network_type,
            bridge_interface,
            network,
            prefix,
            gateway,
            dns_servers,
            tags,
        } => {
            let request = CreateNetworkRequest {
                name: name.clone(),
                network_type: network_type.clone(),
                bridge_interface: bridge_interface.clone(),
                network: network.clone(),
                prefix: prefix.clone(),
                gateway: gateway.clone(),
                dns_servers: dns_servers.clone(),
                tags: parse_tags(tags),
            };
            let response = session.network().create(&request)?;
            print_json(&response)?;
        }

        NetworkCommands::Delete { network_id } => {
            let response = session.network().delete(network_id)?;
            print_json(&response)?;
        }
    }
    Ok(())
}

fn print_networks(records: &[Value], output: OutputFormat, wide: bool) -> CliResult<()> {
    match output {
        OutputFormat::Table => {
            print_table(&network_table_records(records), &NETWORK_COLUMNS, wide)
        }
        OutputFormat::Json => print_json(&records)?,
    }
    Ok(())
}

// The CIDR and the joined DNS list only exist for the table; json output
// keeps the nested config untouched.
fn network_table_records(records: &[Value]) -> Vec<Value> {
    records
        .iter()
        .cloned()
        .map(|mut record| {
            if let Some(network) = record.as_object_mut() {
                let cidr = network_cidr(network);
                let dns = joined_dns(network);
                network.insert("cidr".to_string(), Value::String(cidr));
                network.insert("dns_servers".to_string(), Value::String(dns));
            }
            record
        })
        .collect()
}

fn network_cidr(network: &Map<String, Value>) -> String {
    let config = match network.get("config") {
        Some(Value::Object(config)) => config,
        _ => return String::new(),
    };
    match (config.get("network"), config.get("prefix")) {
        (Some(address), Some(prefix)) => {
            format!("{}/{}", render_value(address), render_value(prefix))
        }
        _ => String::new(),
    }
}

fn joined_dns(network: &Map<String, Value>) -> String {
    let servers = match network.get("config").and_then(|config| config.get("dns_servers")) {
        Some(Value::Array(servers)) => servers,
        _ => return String::new(),
    };
    servers
        .iter()
        .map(render_value)
        .collect::<Vec<_>>()
        .join(",")
}
