// HTTP session and per-service clients for the ecHome API.

use log::debug;
use reqwest::blocking::{Client, RequestBuilder, Response};
use serde::Serialize;
use serde_json::{Map, Value};

use crate::config::resolve_settings;
use crate::error::{CliError, CliResult};
use crate::output::OutputFormat;

pub struct Session {
    http: Client,
    server: String,
    token: Option<String>,
    format: OutputFormat,
}

impl Session {
    pub fn open(profile: Option<&str>) -> CliResult<Self> {
        let settings = resolve_settings(profile)?;
        Ok(Session {
            http: Client::new(),
            server: settings.server.trim_end_matches('/').to_string(),
            token: settings.token,
            format: settings.format,
        })
    }

    /// Output format for a command, honoring an explicit `-o` first.
    pub fn format(&self, requested: Option<OutputFormat>) -> OutputFormat {
        requested.unwrap_or(self.format)
    }

    pub fn vm(&self) -> VmClient<'_> {
        VmClient { session: self }
    }

    pub fn images(&self) -> ImageClient<'_> {
        ImageClient { session: self }
    }

    pub fn sshkeys(&self) -> SshKeyClient<'_> {
        SshKeyClient { session: self }
    }

    pub fn network(&self) -> NetworkClient<'_> {
        NetworkClient { session: self }
    }

    pub fn kube(&self) -> KubeClient<'_> {
        KubeClient { session: self }
    }

    pub fn identity(&self) -> IdentityClient<'_> {
        IdentityClient { session: self }
    }

    fn url(&self, path: &str) -> String {
        format!("{}/api/v1{}", self.server, path)
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    fn get(&self, path: &str) -> CliResult<Value> {
        let url = self.url(path);
        debug!("GET {}", url);
        let response = self.authorize(self.http.get(&url)).send()?;
        parse_response(response)
    }

    fn post<T: Serialize>(&self, path: &str, body: &T) -> CliResult<Value> {
        let url = self.url(path);
        debug!("POST {}", url);
        let response = self.authorize(self.http.post(&url).json(body)).send()?;
        parse_response(response)
    }

    fn post_empty(&self, path: &str) -> CliResult<Value> {
        let url = self.url(path);
        debug!("POST {}", url);
        let response = self.authorize(self.http.post(&url)).send()?;
        parse_response(response)
    }

    /// GET on an endpoint that wraps its records in a `results` list.
    fn get_results(&self, path: &str) -> CliResult<Vec<Value>> {
        results_list(self.get(path)?)
    }
}

fn parse_response(response: Response) -> CliResult<Value> {
    let status = response.status();
    if status.is_success() {
        Ok(response.json()?)
    } else {
        let body = response.text().unwrap_or_default();
        Err(CliError::Api {
            status: status.as_u16(),
            message: api_message(&body),
        })
    }
}

// The server reports failures as {"error": "..."}; fall back to the raw
// body when it does not.
fn api_message(body: &str) -> String {
    match serde_json::from_str::<Value>(body) {
        Ok(parsed) => match parsed.get("error").and_then(Value::as_str) {
            Some(message) => message.to_string(),
            None => body.trim().to_string(),
        },
        Err(_) => body.trim().to_string(),
    }
}

fn results_list(response: Value) -> CliResult<Vec<Value>> {
    match response.get("results").and_then(Value::as_array) {
        Some(records) => Ok(records.clone()),
        None => Err(CliError::BadResponse(
            "missing 'results' list".to_string(),
        )),
    }
}

/// Splits `key=value` tag arguments into a JSON map. A bare key becomes a
/// tag with an empty value.
pub fn parse_tags(pairs: &[String]) -> Map<String, Value> {
    let mut tags = Map::new();
    for pair in pairs {
        match pair.split_once('=') {
            Some((key, value)) => {
                tags.insert(key.to_string(), Value::String(value.to_string()))
            }
            None => tags.insert(pair.clone(), Value::String(String::new())),
        };
    }
    tags
}

pub struct VmClient<'a> {
    session: &'a Session,
}

impl VmClient<'_> {
    pub fn describe(&self, vm_id: &str) -> CliResult<Vec<Value>> {
        self.session.get_results(&format!("/vm/describe/{}", vm_id))
    }

    pub fn describe_all(&self) -> CliResult<Vec<Value>> {
        self.session.get_results("/vm/describe/all")
    }

    pub fn create(&self, request: &CreateVmRequest) -> CliResult<Value> {
        self.session.post("/vm/create", request)
    }

    pub fn start(&self, vm_id: &str) -> CliResult<Value> {
        self.session.post_empty(&format!("/vm/start/{}", vm_id))
    }

    pub fn stop(&self, vm_id: &str) -> CliResult<Value> {
        self.session.post_empty(&format!("/vm/stop/{}", vm_id))
    }

    pub fn terminate(&self, vm_id: &str) -> CliResult<Value> {
        self.session.post_empty(&format!("/vm/terminate/{}", vm_id))
    }

    pub fn create_image(&self, vm_id: &str, request: &CreateVmImageRequest) -> CliResult<Value> {
        self.session
            .post(&format!("/vm/create-image/{}", vm_id), request)
    }
}

pub struct ImageClient<'a> {
    session: &'a Session,
}

impl ImageClient<'_> {
    pub fn describe(&self, image_type: &str, image_id: &str) -> CliResult<Vec<Value>> {
        self.session
            .get_results(&format!("/images/{}/describe/{}", image_type, image_id))
    }

    pub fn describe_all(&self, image_type: &str) -> CliResult<Vec<Value>> {
        self.session
            .get_results(&format!("/images/{}/describe/all", image_type))
    }

    pub fn register_guest(&self, request: &RegisterImageRequest) -> CliResult<Value> {
        self.session.post("/images/guest/register", request)
    }
}

pub struct SshKeyClient<'a> {
    session: &'a Session,
}

impl SshKeyClient<'_> {
    pub fn describe(&self, key_name: &str) -> CliResult<Vec<Value>> {
        self.session
            .get_results(&format!("/sshkey/describe/{}", key_name))
    }

    pub fn describe_all(&self) -> CliResult<Vec<Value>> {
        self.session.get_results("/sshkey/describe/all")
    }

    pub fn create(&self, key_name: &str) -> CliResult<Value> {
        self.session.post(
            "/sshkey/create",
            &CreateSshKeyRequest {
                key_name: key_name.to_string(),
            },
        )
    }

    pub fn delete(&self, key_name: &str) -> CliResult<Value> {
        self.session
            .post_empty(&format!("/sshkey/delete/{}", key_name))
    }
}

pub struct NetworkClient<'a> {
    session: &'a Session,
}

impl NetworkClient<'_> {
    pub fn describe(&self, network_id: &str) -> CliResult<Vec<Value>> {
        self.session
            .get_results(&format!("/network/describe/{}", network_id))
    }

    pub fn describe_all(&self) -> CliResult<Vec<Value>> {
        self.session.get_results("/network/describe/all")
    }

    pub fn create(&self, request: &CreateNetworkRequest) -> CliResult<Value> {
        self.session.post("/network/create", request)
    }

    pub fn delete(&self, network_id: &str) -> CliResult<Value> {
        self.session
            .post_empty(&format!("/network/delete/{}", network_id))
    }
}

pub struct KubeClient<'a> {
    session: &'a Session,
}

impl KubeClient<'_> {
    pub fn describe(&self, cluster_name: &str) -> CliResult<Vec<Value>> {
        self.session
            .get_results(&format!("/kube/describe/{}", cluster_name))
    }

    pub fn describe_all(&self) -> CliResult<Vec<Value>> {
        self.session.get_results("/kube/describe/all")
    }

    pub fn create(&self, request: &CreateClusterRequest) -> CliResult<Value> {
        self.session.post("/kube/create", request)
    }

    pub fn terminate(&self, cluster_name: &str) -> CliResult<Value> {
        self.session
            .post_empty(&format!("/kube/terminate/{}", cluster_name))
    }

    pub fn get_config(&self, cluster_name: &str) -> CliResult<Value> {
        self.session
            .get(&format!("/kube/get-config/{}", cluster_name))
    }

    pub fn add_node(&self, cluster_name: &str, request: &AddNodeRequest) -> CliResult<Value> {
        self.session
            .post(&format!("/kube/add-node/{}", cluster_name), request)
    }
}

pub struct IdentityClient<'a> {
    session: &'a Session,
}

impl IdentityClient<'_> {
    pub fn describe(&self, username: &str) -> CliResult<Vec<Value>> {
        self.session
            .get_results(&format!("/identity/describe/{}", username))
    }

    pub fn describe_all(&self) -> CliResult<Vec<Value>> {
        self.session.get_results("/identity/describe/all")
    }

    pub fn describe_caller(&self) -> CliResult<Vec<Value>> {
        self.session.get_results("/identity/describe-caller")
    }

    pub fn create(&self, request: &CreateUserRequest) -> CliResult<Value> {
        self.session.post("/identity/create", request)
    }

    pub fn delete(&self, user_id: &str) -> CliResult<Value> {
        self.session
            .post_empty(&format!("/identity/delete/{}", user_id))
    }
}

// Request bodies. Field names follow the server's PascalCase parameters.

#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct CreateVmRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub volume_id: Option<String>,
    pub instance_size: String,
    pub network_profile: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub private_ip: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub disk_size: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub disk_image_id: Option<String>,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub enable_vnc: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vnc_port: Option<String>,
    /// Base64 cloud-init payload.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_data: Option<String>,
    #[serde(skip_serializing_if = "Map::is_empty")]
    pub tags: Map<String, Value>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct CreateVmImageRequest {
    pub name: String,
    pub description: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct RegisterImageRequest {
    pub image_path: String,
    pub image_name: String,
    pub image_description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_user: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_password: Option<String>,
    #[serde(skip_serializing_if = "Map::is_empty")]
    pub tags: Map<String, Value>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
struct CreateSshKeyRequest {
    key_name: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct CreateNetworkRequest {
    pub name: String,
    #[serde(rename = "Type")]
    pub network_type: String,
    pub bridge_interface: String,
    pub network: String,
    pub prefix: String,
    pub gateway: String,
    pub dns_servers: Vec<String>,
    #[serde(skip_serializing_if = "Map::is_empty")]
    pub tags: Map<String, Value>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct CreateClusterRequest {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    pub instance_size: String,
    pub network_profile: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key_name: Option<String>,
    pub image_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub disk_size: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub node_ips: Vec<String>,
    #[serde(skip_serializing_if = "Map::is_empty")]
    pub tags: Map<String, Value>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct AddNodeRequest {
    pub instance_size: String,
    pub network_profile: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub node_ip: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key_name: Option<String>,
    pub image_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub disk_size: Option<String>,
    #[serde(skip_serializing_if = "Map::is_empty")]
    pub tags: Map<String, Value>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct CreateUserRequest {
    pub username: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    /// Omitted when the server should generate one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    #[serde(skip_serializing_if = "Map::is_empty")]
    pub tags: Map<String, Value>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_tags_pairs() {
        let tags = parse_tags(&[
            "env=prod".to_string(),
            "owner=ops".to_string(),
            "standalone".to_string(),
        ]);
        assert_eq!(tags.get("env"), Some(&json!("prod")));
        assert_eq!(tags.get("owner"), Some(&json!("ops")));
        assert_eq!(tags.get("standalone"), Some(&json!("")));
    }

    #[test]
    fn test_api_message_extraction() {
        assert_eq!(api_message(r#"{"error": "no such vm"}"#), "no such vm");
        assert_eq!(api_message("502 Bad Gateway\n"), "502 Bad Gateway");
        assert_eq!(api_message(r#"{"detail": "odd shape"}"#), r#"{"detail": "odd shape"}"#);
    }

    #[test]
    fn test_results_list_unwrapping() {
        let records = results_list(json!({"results": [{"name": "web1"}]})).unwrap();
        assert_eq!(records, vec![json!({"name": "web1"})]);

        assert!(results_list(json!({"outcome": []})).is_err());
        assert!(results_list(json!({"results": "nope"})).is_err());
    }

    #[test]
    fn test_create_vm_request_wire_shape() {
        let request = CreateVmRequest {
            image_id: Some("gmi-12345".to_string()),
            volume_id: None,
            instance_size: "standard.small".to_string(),
            network_profile: "home-lan".to_string(),
            private_ip: None,
            key_name: Some("echome".to_string()),
            disk_size: None,
            disk_image_id: None,
            enable_vnc: false,
            vnc_port: None,
            user_data: None,
            tags: parse_tags(&["Name=web1".to_string()]),
        };
        let body = serde_json::to_value(&request).unwrap();
        assert_eq!(
            body,
            json!({
                "ImageId": "gmi-12345",
                "InstanceSize": "standard.small",
                "NetworkProfile": "home-lan",
                "KeyName": "echome",
                "Tags": {"Name": "web1"}
            })
        );
    }

    #[test]
    fn test_create_vm_request_vnc_and_disk_image() {
        let request = CreateVmRequest {
            image_id: Some("gmi-12345".to_string()),
            volume_id: None,
            instance_size: "standard.small".to_string(),
            network_profile: "home-lan".to_string(),
            private_ip: None,
            key_name: None,
            disk_size: None,
            disk_image_id: Some("dmi-67890".to_string()),
            enable_vnc: true,
            vnc_port: Some("5901".to_string()),
            user_data: None,
            tags: Map::new(),
        };
        let body = serde_json::to_value(&request).unwrap();
        assert_eq!(body.get("DiskImageId"), Some(&json!("dmi-67890")));
        assert_eq!(body.get("EnableVnc"), Some(&json!(true)));
        assert_eq!(body.get("VncPort"), Some(&json!("5901")));
    }

    #[test]
    fn test_network_request_type_field() {
        let request = CreateNetworkRequest {
            name: "home-lan".to_string(),
            network_type: "BridgeToLan".to_string(),
            bridge_interface: "br0".to_string(),
            network: "192.168.15.0".to_string(),
            prefix: "24".to_string(),
            gateway: "192.168.15.1".to_string(),
            dns_servers: vec!["1.1.1.1".to_string(), "1.0.0.1".to_string()],
            tags: Map::new(),
        };
        let body = serde_json::to_value(&request).unwrap();
        assert_eq!(body.get("Type"), Some(&json!("BridgeToLan")));
        assert_eq!(body.get("DnsServers"), Some(&json!(["1.1.1.1", "1.0.0.1"])));
        assert!(body.get("Tags").is_none());
    }
}
