use serde_json::Value;
use std::fs::OpenOptions;
use std::io::Write;

use crate::cli::SshKeyCommands;
use crate::client::Session;
use crate::error::{CliError, CliResult};
use crate::output::{print_json, print_output};
use crate::table::{ColumnSpec, RenderSpec};

const KEY_COLUMNS: RenderSpec = RenderSpec {
    columns: &[
        ("Name", ColumnSpec::Key("name")),
        ("Key Id", ColumnSpec::Key("key_id")),
        ("Fingerprint", ColumnSpec::Key("fingerprint")),
    ],
    wide_columns: &[("Created", ColumnSpec::Key("created"))],
};

pub fn handle_keys_command(cmd: &SshKeyCommands, session: &Session) -> CliResult<()> {
    match cmd {
        SshKeyCommands::Describe {
            key_name,
            output,
            wide,
        } => {
            let records = session.sshkeys().describe(key_name)?;
            print_output(&records, &KEY_COLUMNS, session.format(*output), *wide)?;
        }

        SshKeyCommands::DescribeAll { output, wide } => {
            let records = session.sshkeys().describe_all()?;
            print_output(&records, &KEY_COLUMNS, session.format(*output), *wide)?;
        }

        SshKeyCommands::Create {
            key_name,
            file,
            no_file,
        } => {
            create_key(session, key_name, file.as_deref(), *no_file)?;
        }

        SshKeyCommands::Delete { key_name } => {
            let response = session.sshkeys().delete(key_name)?;
            print_json(&response)?;
        }
    }
    Ok(())
}

// The private key only exists in this one response; it is either appended
// to the requested file or printed, never both.
fn create_key(
    session: &Session,
    key_name: &str,
    file: Option<&str>,
    no_file: bool,
) -> CliResult<()> {
    let mut response = session.sshkeys().create(key_name)?;

    if response.get("success").and_then(Value::as_bool) == Some(false) {
        return Err(CliError::BadResponse(format!(
            "key creation failed: {}",
            response
        )));
    }

    if no_file {
        print_json(&response)?;
        return Ok(());
    }

    let Some(path) = file else {
        return Err(CliError::Config("no key file given".to_string()));
    };
    let Some(private_key) = response
        .get("PrivateKey")
        .and_then(Value::as_str)
        .map(str::to_string)
    else {
        return Err(CliError::BadResponse(
            "response is missing PrivateKey".to_string(),
        ));
    };

    let mut key_file = OpenOptions::new().create(true).append(true).open(path)?;
    key_file.write_all(private_key.as_bytes())?;

    // Echo the response with the key material swapped for the file path.
    if let Some(fields) = response.as_object_mut() {
        fields.insert("PrivateKey".to_string(), Value::String(path.to_string()));
    }
    print_json(&response)?;
    Ok(())
}
