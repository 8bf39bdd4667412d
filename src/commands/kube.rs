use chrono::Utc;
use serde_json::Value;
use serde_yaml::Value as YamlValue;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use crate::cli::KubeCommands;
use crate::client::{parse_tags, AddNodeRequest, CreateClusterRequest, Session};
use crate::error::{CliError, CliResult};
use crate::output::{print_info, print_json, print_output, print_success};
use crate::table::{ColumnSpec, RenderSpec};

const CLUSTER_COLUMNS: RenderSpec = RenderSpec {
    columns: &[
        ("Name", ColumnSpec::Key("name")),
        ("Cluster ID", ColumnSpec::Key("cluster_id")),
        ("Controller VM", ColumnSpec::Key("primary")),
        (
            "Node VMs",
            ColumnSpec::Path(&["associated_instances", "instance_id"]),
        ),
        ("Status", ColumnSpec::Key("status")),
        ("Version", ColumnSpec::Key("version")),
        ("Created", ColumnSpec::Key("created")),
    ],
    wide_columns: &[],
};

// Kubeconfig sections that carry one entry per cluster.
const KUBECONFIG_SECTIONS: [&str; 3] = ["clusters", "contexts", "users"];

pub fn handle_kube_command(cmd: &KubeCommands, session: &Session) -> CliResult<()> {
    match cmd {
        KubeCommands::Describe {
            cluster_name,
            output,
            wide,
        } => {
            let records = session.kube().describe(cluster_name)?;
            print_output(&records, &CLUSTER_COLUMNS, session.format(*output), *wide)?;
        }

        KubeCommands::DescribeAll { output, wide } => {
            let records = session.kube().describe_all()?;
            print_output(&records, &CLUSTER_COLUMNS, session.format(*output), *wide)?;
        }

        KubeCommands::Create {
            name,
            version,
            instance_size,
            network_profile,
            key_name,
            image_id,
            disk_size,
            node_ips,
            tags,
        } => {
            let request = CreateClusterRequest {
                name: name.clone(),
                version: version.clone(),
                instance_size: instance_size.clone(),
                network_profile: network_profile.clone(),
                key_name: key_name.clone(),
                image_id: image_id.clone(),
                disk_size: disk_size.clone(),
                node_ips: node_ips.clone(),
                tags: parse_tags(tags),
            };
            let response = session.kube().create(&request)?;
            print_json(&response)?;
        }

        KubeCommands::Terminate { cluster_name } => {
            let response = session.kube().terminate(cluster_name)?;
            print_json(&response)?;
        }

        KubeCommands::GetConfig {
            cluster_name,
            file,
            no_file,
            kubeconfig,
        } => {
            get_cluster_config(session, cluster_name, file.as_deref(), *no_file, *kubeconfig)?;
        }

        KubeCommands::AddNode {
            cluster_name,
            instance_size,
            network_profile,
            node_ip,
            key_name,
            image_id,
            disk_size,
            tags,
        } => {
            let request = AddNodeRequest {
                instance_size: instance_size.clone(),
                network_profile: network_profile.clone(),
                node_ip: node_ip.clone(),
                key_name: key_name.clone(),
                image_id: image_id.clone(),
                disk_size: disk_size.clone(),
                tags: parse_tags(tags),
            };
            let response = session.kube().add_node(cluster_name, &request)?;
            print_json(&response)?;
        }
    }
    Ok(())
}

fn get_cluster_config(
    session: &Session,
    cluster_name: &str,
    file: Option<&str>,
    no_file: bool,
    kubeconfig: bool,
) -> CliResult<()> {
    let response = session.kube().get_config(cluster_name)?;
    let Some(admin_conf) = response
        .get("results")
        .and_then(|results| results.get("admin.conf"))
        .and_then(Value::as_str)
    else {
        return Err(CliError::BadResponse(
            "response is missing the cluster admin config".to_string(),
        ));
    };

    if no_file {
        println!("{}", admin_conf);
        return Ok(());
    }

    let target = match file {
        Some(path) => PathBuf::from(path),
        None if kubeconfig => default_kubeconfig_path()?,
        None => return Err(CliError::Config("no kubeconfig target given".to_string())),
    };
    write_cluster_config(&target, admin_conf)
}

fn default_kubeconfig_path() -> CliResult<PathBuf> {
    if let Ok(path) = env::var("KUBECONFIG") {
        if !path.is_empty() {
            return Ok(PathBuf::from(path));
        }
    }
    dirs::home_dir()
        .map(|home| home.join(".kube").join("config"))
        .ok_or_else(|| CliError::Config("cannot determine the home directory".to_string()))
}

// A fresh or empty target takes the config verbatim; anything else gets a
// merge, with the previous file backed up under the temp directory first.
fn write_cluster_config(path: &Path, admin_conf: &str) -> CliResult<()> {
    let existing = match fs::metadata(path) {
        Ok(metadata) if metadata.len() > 0 => fs::read_to_string(path)?,
        _ => String::new(),
    };

    if existing.is_empty() {
        fs::write(path, admin_conf)?;
        print_success(&format!("Wrote cluster config to {}", path.display()));
        return Ok(());
    }

    let mut current: YamlValue = serde_yaml::from_str(&existing)?;
    let incoming: YamlValue = serde_yaml::from_str(admin_conf)?;
    merge_kubeconfig(&mut current, &incoming)?;

    let backup = env::temp_dir().join(format!("kubeconfig.{}", Utc::now().timestamp()));
    print_info(&format!(
        "Backing up {} to {}",
        path.display(),
        backup.display()
    ));
    fs::copy(path, &backup)?;

    fs::write(path, serde_yaml::to_string(&current)?)?;
    print_success("Added cluster context to the kubeconfig file.");
    Ok(())
}

/// Folds the first entry of each per-cluster section of `incoming` into
/// `current`, replacing entries with the same name, then adopts the
/// incoming current-context. Unrelated entries are left alone.
fn merge_kubeconfig(current: &mut YamlValue, incoming: &YamlValue) -> CliResult<()> {
    for section in KUBECONFIG_SECTIONS {
        let Some(added) = incoming.get(section).and_then(YamlValue::as_sequence) else {
            return Err(CliError::Kubeconfig(format!(
                "cluster config has no '{}' section",
                section
            )));
        };
        let Some(entry) = added.first() else {
            return Err(CliError::Kubeconfig(format!(
                "cluster config has an empty '{}' section",
                section
            )));
        };
        let name = entry_name(entry);

        if current.get(section).is_none() {
            let Some(root) = current.as_mapping_mut() else {
                return Err(CliError::Kubeconfig(
                    "existing kubeconfig is not a mapping".to_string(),
                ));
            };
            root.insert(
                YamlValue::String(section.to_string()),
                YamlValue::Sequence(Vec::new()),
            );
        }
        let Some(entries) = current.get_mut(section).and_then(YamlValue::as_sequence_mut)
        else {
            return Err(CliError::Kubeconfig(format!(
                "kubeconfig '{}' section is not a list",
                section
            )));
        };

        entries.retain(|candidate| entry_name(candidate) != name);
        entries.push(entry.clone());
    }

    if let Some(context) = incoming.get("current-context") {
        let Some(root) = current.as_mapping_mut() else {
            return Err(CliError::Kubeconfig(
                "existing kubeconfig is not a mapping".to_string(),
            ));
        };
        root.insert(
            YamlValue::String("current-context".to_string()),
            context.clone(),
        );
    }
    Ok(())
}

fn entry_name(entry: &YamlValue) -> Option<&str> {
    entry.get("name").and_then(YamlValue::as_str)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::project;
    use serde_json::json;

    const EXISTING: &str = "
apiVersion: v1
kind: Config
clusters:
- cluster:
    server: https://10.0.0.10:6443
  name: old-cluster
contexts:
- context:
    cluster: old-cluster
    user: old-admin
  name: old-admin@old-cluster
users:
- name: old-admin
  user:
    token: abc
current-context: old-admin@old-cluster
";

    const INCOMING: &str = "
apiVersion: v1
kind: Config
clusters:
- cluster:
    server: https://172.16.9.20:6443
  name: kubernetes
contexts:
- context:
    cluster: kubernetes
    user: kubernetes-admin
  name: kubernetes-admin@kubernetes
users:
- name: kubernetes-admin
  user:
    token: xyz
current-context: kubernetes-admin@kubernetes
";

    #[test]
    fn test_merge_appends_new_entries() {
        let mut current: YamlValue = serde_yaml::from_str(EXISTING).unwrap();
        let incoming: YamlValue = serde_yaml::from_str(INCOMING).unwrap();
        merge_kubeconfig(&mut current, &incoming).unwrap();

        let clusters = current
            .get("clusters")
            .and_then(YamlValue::as_sequence)
            .unwrap();
        assert_eq!(clusters.len(), 2);
        assert_eq!(entry_name(&clusters[0]), Some("old-cluster"));
        assert_eq!(entry_name(&clusters[1]), Some("kubernetes"));
        assert_eq!(
            current.get("current-context").and_then(YamlValue::as_str),
            Some("kubernetes-admin@kubernetes")
        );
    }

    #[test]
    fn test_merge_replaces_matching_names() {
        let mut current: YamlValue = serde_yaml::from_str(INCOMING).unwrap();
        let incoming: YamlValue = serde_yaml::from_str(INCOMING).unwrap();
        merge_kubeconfig(&mut current, &incoming).unwrap();

        for section in KUBECONFIG_SECTIONS {
            let entries = current
                .get(section)
                .and_then(YamlValue::as_sequence)
                .unwrap();
            assert_eq!(entries.len(), 1, "duplicated entries in '{}'", section);
        }
    }

    #[test]
    fn test_merge_requires_incoming_sections() {
        let mut current: YamlValue = serde_yaml::from_str(EXISTING).unwrap();
        let incoming: YamlValue = serde_yaml::from_str("apiVersion: v1\nkind: Config\n").unwrap();
        assert!(merge_kubeconfig(&mut current, &incoming).is_err());
    }

    #[test]
    fn test_merge_creates_missing_section() {
        let trimmed = "
apiVersion: v1
kind: Config
clusters:
- cluster:
    server: https://10.0.0.10:6443
  name: old-cluster
contexts:
- context:
    cluster: old-cluster
    user: old-admin
  name: old-admin@old-cluster
";
        let mut current: YamlValue = serde_yaml::from_str(trimmed).unwrap();
        let incoming: YamlValue = serde_yaml::from_str(INCOMING).unwrap();
        merge_kubeconfig(&mut current, &incoming).unwrap();

        let users = current
            .get("users")
            .and_then(YamlValue::as_sequence)
            .unwrap();
        assert_eq!(users.len(), 1);
        assert_eq!(entry_name(&users[0]), Some("kubernetes-admin"));
    }

    #[test]
    fn test_cluster_table_rows() {
        let records = vec![json!({
            "name": "k8s-lab",
            "cluster_id": "kube-610c9a",
            "primary": "vm-aa11bb",
            "associated_instances": [
                {"instance_id": "vm-cc22dd"},
                {"instance_id": "vm-ee33ff"}
            ],
            "status": "Ready",
            "version": "1.21",
            "created": "2021-06-01 10:00:00"
        })];
        let rows = project(&records, &CLUSTER_COLUMNS, false);
        assert_eq!(
            rows,
            vec![vec![
                "k8s-lab",
                "kube-610c9a",
                "vm-aa11bb",
                "vm-cc22dd,vm-ee33ff",
                "Ready",
                "1.21",
                "2021-06-01 10:00:00",
            ]]
        );
    }
}
