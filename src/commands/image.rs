use crate::cli::ImageCommands;
use crate::client::{parse_tags, RegisterImageRequest, Session};
use crate::error::CliResult;
use crate::output::{print_json, print_output};
use crate::table::{ColumnSpec, RenderSpec};

const IMAGE_COLUMNS: RenderSpec = RenderSpec {
    columns: &[
        ("Name", ColumnSpec::Key("name")),
        ("Image Id", ColumnSpec::Key("image_id")),
        ("Format", ColumnSpec::Path(&["metadata", "format"])),
        ("State", ColumnSpec::Key("state")),
        ("Description", ColumnSpec::Key("description")),
    ],
    wide_columns: &[],
};

pub fn handle_image_command(cmd: &ImageCommands, session: &Session) -> CliResult<()> {
    match cmd {
        ImageCommands::Register {
            image_path,
            image_name,
            image_description,
            image_user,
            image_password,
            tags,
        } => {
            let request = RegisterImageRequest {
                image_path: image_path.clone(),
                image_name: image_name.clone(),
                image_description: image_description.clone(),
                image_user: image_user.clone(),
                image_password: image_password.clone(),
                tags: parse_tags(tags),
            };
            let response = session.images().register_guest(&request)?;
            print_json(&response)?;
        }

        ImageCommands::Describe {
            image_id,
            image_type,
            output,
            wide,
        } => {
            let records = session
                .images()
                .describe(image_type.path_segment(), image_id)?;
            print_output(&records, &IMAGE_COLUMNS, session.format(*output), *wide)?;
        }

        ImageCommands::DescribeAll {
            image_type,
            output,
            wide,
        } => {
            let records = session.images().describe_all(image_type.path_segment())?;
            print_output(&records, &IMAGE_COLUMNS, session.format(*output), *wide)?;
        }
    }
    Ok(())
}
