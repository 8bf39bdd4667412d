use serde_json::{json, Value};

use crate::cli::IdentityCommands;
use crate::client::{parse_tags, CreateUserRequest, Session};
use crate::error::CliResult;
use crate::output::{print_json, print_table, OutputFormat};
use crate::table::{ColumnSpec, RenderSpec};

const USER_COLUMNS: RenderSpec = RenderSpec {
    columns: &[
        ("Name", ColumnSpec::Key("name")),
        ("Username", ColumnSpec::Key("username")),
        ("User ID", ColumnSpec::Key("user_id")),
        ("Type", ColumnSpec::Key("type")),
        ("Created", ColumnSpec::Key("created")),
    ],
    wide_columns: &[],
};

pub fn handle_identity_command(cmd: &IdentityCommands, session: &Session) -> CliResult<()> {
    match cmd {
        IdentityCommands::Describe {
            username,
            output,
            wide,
        } => {
            let records = session.identity().describe(username)?;
            // Table mode appends one row per API credential of the user.
            match session.format(*output) {
                OutputFormat::Table => {
                    print_table(&with_auth_rows(&records), &USER_COLUMNS, *wide)
                }
                OutputFormat::Json => print_json(&records)?,
            }
        }

        IdentityCommands::DescribeAll { output, wide } => {
            let records = session.identity().describe_all()?;
            print_users(&records, session.format(*output), *wide)?;
        }

        IdentityCommands::DescribeCaller { output, wide } => {
            let records = session.identity().describe_caller()?;
            print_users(&records, session.format(*output), *wide)?;
        }

        IdentityCommands::Create {
            username,
            name,
            email,
            password,
            no_password: _,
            tags,
        } => {
            let request = CreateUserRequest {
                username: username.clone(),
                name: name.clone(),
                email: email.clone(),
                password: password.clone(),
                tags: parse_tags(tags),
            };
            let response = session.identity().create(&request)?;
            print_json(&response)?;
        }

        IdentityCommands::Delete { user_id } => {
            let response = session.identity().delete(user_id)?;
            print_json(&response)?;
        }
    }
    Ok(())
}

fn print_users(records: &[Value], output: OutputFormat, wide: bool) -> CliResult<()> {
    match output {
        OutputFormat::Table => print_table(records, &USER_COLUMNS, wide),
        OutputFormat::Json => print_json(&records)?,
    }
    Ok(())
}

// API credentials of the first user become rows of their own, blank in the
// Name and Username columns and carrying the auth id in User ID.
fn with_auth_rows(records: &[Value]) -> Vec<Value> {
    let mut rows = records.to_vec();
    let auth_entries = records
        .first()
        .and_then(|user| user.get("auth"))
        .and_then(Value::as_array)
        .cloned()
        .unwrap_or_default();
    for auth in auth_entries {
        rows.push(json!({
            "name": "",
            "username": "",
            "user_id": auth.get("auth_id").cloned().unwrap_or(Value::Null),
            "type": auth.get("type").cloned().unwrap_or(Value::Null),
            "created": auth.get("created").cloned().unwrap_or(Value::Null),
        }));
    }
    rows
}
