use clap::{ArgAction, Parser, Subcommand, ValueEnum};

use crate::output::OutputFormat;

#[derive(Parser)]
#[command(version, long_about = None)]
#[command(name = "echome")]
#[command(about = "Manage virtual machines, networks, and Kubernetes clusters on an ecHome server")]
pub struct Cli {
    /// Profile from ~/.echome/config.yaml to use
    #[arg(short, long, global = true, env = "ECHOME_PROFILE")]
    pub profile: Option<String>,

    /// Increase log verbosity (repeat for more)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub debug: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Virtual machine commands
    #[command(subcommand)]
    Vm(VmCommands),

    /// Guest and user image commands
    #[command(subcommand)]
    Image(ImageCommands),

    /// SSH key commands
    #[command(subcommand)]
    Sshkey(SshKeyCommands),

    /// Virtual network commands
    #[command(subcommand)]
    Network(NetworkCommands),

    /// Kubernetes cluster commands
    #[command(subcommand)]
    Kube(KubeCommands),

    /// User and API credential commands
    #[command(subcommand)]
    Identity(IdentityCommands),
}

#[derive(Subcommand)]
pub enum VmCommands {
    /// Show details for one virtual machine
    Describe {
        /// Virtual machine id
        vm_id: String,

        /// Output format as JSON or Table
        #[arg(short, long, value_enum)]
        output: Option<OutputFormat>,

        /// Show more columns when more data is available in table view
        #[arg(short, long)]
        wide: bool,
    },

    /// List all virtual machines
    DescribeAll {
        /// Output format as JSON or Table
        #[arg(short, long, value_enum)]
        output: Option<OutputFormat>,

        /// Show more columns when more data is available in table view
        #[arg(short, long)]
        wide: bool,
    },

    /// Create a virtual machine
    Create {
        /// Image to boot from
        #[arg(long, required_unless_present = "volume_id", conflicts_with = "volume_id")]
        image_id: Option<String>,

        /// Existing volume to clone as the root disk
        #[arg(long)]
        volume_id: Option<String>,

        /// Instance size, e.g. standard.small
        #[arg(long)]
        instance_size: String,

        /// Network profile for the primary interface
        #[arg(long)]
        network_profile: String,

        /// Static private IP for the primary interface
        #[arg(long)]
        private_ip: Option<String>,

        /// SSH key installed for the default user
        #[arg(long)]
        key_name: Option<String>,

        /// Root disk size, e.g. 30G
        #[arg(long)]
        disk_size: Option<String>,

        /// Extra disk image mounted to the virtual machine
        #[arg(long)]
        disk_image_id: Option<String>,

        /// File uploaded as cloud-init user data
        #[arg(long)]
        user_data_file: Option<String>,

        /// Enable VNC access to the virtual machine
        #[arg(long)]
        enable_vnc: bool,

        /// VNC port to use when VNC is enabled
        #[arg(long)]
        vnc_port: Option<String>,

        /// Shortcut for the Name tag
        #[arg(long)]
        name: Option<String>,

        /// Tags as key=value pairs
        #[arg(long, value_delimiter = ',')]
        tags: Vec<String>,
    },

    /// Start a stopped virtual machine
    Start {
        /// Virtual machine id
        vm_id: String,
    },

    /// Stop a running virtual machine
    Stop {
        /// Virtual machine id
        vm_id: String,
    },

    /// Terminate a virtual machine and delete its resources
    Terminate {
        /// Virtual machine id
        vm_id: String,
    },

    /// Create a user image from a virtual machine
    CreateImage {
        /// Virtual machine id
        vm_id: String,

        /// Name for the new image
        #[arg(long)]
        name: String,

        /// Description for the new image
        #[arg(long)]
        description: String,
    },
}

#[derive(Subcommand)]
pub enum ImageCommands {
    /// Register a guest image already present on the server
    Register {
        /// Path to the image file on the server
        #[arg(long)]
        image_path: String,

        /// Name for the image
        #[arg(long)]
        image_name: String,

        /// Description for the image
        #[arg(long)]
        image_description: String,

        /// Default login user baked into the image
        #[arg(long)]
        image_user: Option<String>,

        /// Password of the default login user
        #[arg(long)]
        image_password: Option<String>,

        /// Tags as key=value pairs
        #[arg(long, value_delimiter = ',')]
        tags: Vec<String>,
    },

    /// Show details for one image
    Describe {
        /// Image id
        image_id: String,

        /// Image class to query
        #[arg(long = "type", value_enum, default_value = "guest")]
        image_type: ImageType,

        /// Output format as JSON or Table
        #[arg(short, long, value_enum)]
        output: Option<OutputFormat>,

        /// Show more columns when more data is available in table view
        #[arg(short, long)]
        wide: bool,
    },

    /// List all images
    DescribeAll {
        /// Image class to query
        #[arg(long = "type", value_enum, default_value = "guest")]
        image_type: ImageType,

        /// Output format as JSON or Table
        #[arg(short, long, value_enum)]
        output: Option<OutputFormat>,

        /// Show more columns when more data is available in table view
        #[arg(short, long)]
        wide: bool,
    },
}

#[derive(Subcommand)]
pub enum SshKeyCommands {
    /// Show details for one SSH key
    Describe {
        /// Key name
        key_name: String,

        /// Output format as JSON or Table
        #[arg(short, long, value_enum)]
        output: Option<OutputFormat>,

        /// Show more columns when more data is available in table view
        #[arg(short, long)]
        wide: bool,
    },

    /// List all SSH keys
    DescribeAll {
        /// Output format as JSON or Table
        #[arg(short, long, value_enum)]
        output: Option<OutputFormat>,

        /// Show more columns when more data is available in table view
        #[arg(short, long)]
        wide: bool,
    },

    /// Create an SSH key and save the private key
    Create {
        /// Key name
        key_name: String,

        /// File the new private key is appended to
        #[arg(long, required_unless_present = "no_file", conflicts_with = "no_file")]
        file: Option<String>,

        /// Print the private key in the response instead of writing a file
        #[arg(long)]
        no_file: bool,
    },

    /// Delete an SSH key
    Delete {
        /// Key name
        key_name: String,
    },
}

#[derive(Subcommand)]
pub enum NetworkCommands {
    /// Show details for one virtual network
    Describe {
        /// Network id
        network_id: String,

        /// Output format as JSON or Table
        #[arg(short, long, value_enum)]
        output: Option<OutputFormat>,

        /// Show more columns when more data is available in table view
        #[arg(short, long)]
        wide: bool,
    },

    /// List all virtual networks
    DescribeAll {
        /// Output format as JSON or Table
        #[arg(short, long, value_enum)]
        output: Option<OutputFormat>,

        /// Show more columns when more data is available in table view
        #[arg(short, long)]
        wide: bool,
    },

    /// Create a virtual network
    Create {
        /// Network name
        #[arg(long)]
        name: String,

        /// Network type
        #[arg(long = "type", default_value = "BridgeToLan")]
        network_type: String,

        /// Host bridge interface the network attaches to
        #[arg(long)]
        bridge_interface: String,

        /// Network address, e.g. 192.168.15.0
        #[arg(long)]
        network: String,

        /// Subnet prefix, e.g. 24
        #[arg(long)]
        prefix: String,

        /// Gateway address
        #[arg(long)]
        gateway: String,

        /// DNS servers for the network
        #[arg(long, value_delimiter = ',')]
        dns_servers: Vec<String>,

        /// Tags as key=value pairs
        #[arg(long, value_delimiter = ',')]
        tags: Vec<String>,
    },

    /// Delete a virtual network
    Delete {
        /// Network id
        network_id: String,
    },
}

#[derive(Subcommand)]
pub enum KubeCommands {
    /// Show details for one cluster
    Describe {
        /// Cluster name
        cluster_name: String,

        /// Output format as JSON or Table
        #[arg(short, long, value_enum)]
        output: Option<OutputFormat>,

        /// Show more columns when more data is available in table view
        #[arg(short, long)]
        wide: bool,
    },

    /// List all clusters
    DescribeAll {
        /// Output format as JSON or Table
        #[arg(short, long, value_enum)]
        output: Option<OutputFormat>,

        /// Show more columns when more data is available in table view
        #[arg(short, long)]
        wide: bool,
    },

    /// Create a Kubernetes cluster
    Create {
        /// Cluster name
        #[arg(long)]
        name: String,

        /// Kubernetes version for the cluster
        #[arg(long)]
        version: Option<String>,

        /// Instance size for the cluster nodes
        #[arg(long)]
        instance_size: String,

        /// Network profile for the cluster nodes
        #[arg(long)]
        network_profile: String,

        /// SSH key installed on the cluster nodes
        #[arg(long)]
        key_name: Option<String>,

        /// Image the cluster nodes boot from
        #[arg(long)]
        image_id: String,

        /// Root disk size for the cluster nodes
        #[arg(long)]
        disk_size: Option<String>,

        /// Static IPs for the cluster nodes, controller first
        #[arg(long, value_delimiter = ',')]
        node_ips: Vec<String>,

        /// Tags as key=value pairs
        #[arg(long, value_delimiter = ',')]
        tags: Vec<String>,
    },

    /// Terminate a cluster and its node virtual machines
    Terminate {
        /// Cluster name
        cluster_name: String,
    },

    /// Download a cluster's admin kubeconfig
    GetConfig {
        /// Cluster name
        cluster_name: String,

        /// File the cluster config is written to
        #[arg(
            long,
            required_unless_present_any = ["no_file", "kubeconfig"],
            conflicts_with_all = ["no_file", "kubeconfig"]
        )]
        file: Option<String>,

        /// Print the config instead of writing a file
        #[arg(long, conflicts_with = "kubeconfig")]
        no_file: bool,

        /// Merge into the default kubeconfig ($KUBECONFIG or ~/.kube/config)
        #[arg(long)]
        kubeconfig: bool,
    },

    /// Add a node to an existing cluster
    AddNode {
        /// Cluster name
        cluster_name: String,

        /// Instance size for the new node
        #[arg(long)]
        instance_size: String,

        /// Network profile for the new node
        #[arg(long)]
        network_profile: String,

        /// Static IP for the new node
        #[arg(long)]
        node_ip: Option<String>,

        /// SSH key installed on the new node
        #[arg(long)]
        key_name: Option<String>,

        /// Image the new node boots from
        #[arg(long)]
        image_id: String,

        /// Root disk size for the new node
        #[arg(long)]
        disk_size: Option<String>,

        /// Tags as key=value pairs
        #[arg(long, value_delimiter = ',')]
        tags: Vec<String>,
    },
}

#[derive(Subcommand)]
pub enum IdentityCommands {
    /// Show details for one user
    Describe {
        /// Username
        username: String,

        /// Output format as JSON or Table
        #[arg(short, long, value_enum)]
        output: Option<OutputFormat>,

        /// Show more columns when more data is available in table view
        #[arg(short, long)]
        wide: bool,
    },

    /// List all users in the account
    DescribeAll {
        /// Output format as JSON or Table
        #[arg(short, long, value_enum)]
        output: Option<OutputFormat>,

        /// Show more columns when more data is available in table view
        #[arg(short, long)]
        wide: bool,
    },

    /// Show the identity making this request
    DescribeCaller {
        /// Output format as JSON or Table
        #[arg(short, long, value_enum)]
        output: Option<OutputFormat>,

        /// Show more columns when more data is available in table view
        #[arg(short, long)]
        wide: bool,
    },

    /// Create a user
    Create {
        /// Username for the new user
        #[arg(long)]
        username: String,

        /// Display name
        #[arg(long)]
        name: Option<String>,

        /// Email address
        #[arg(long)]
        email: Option<String>,

        /// Initial password
        #[arg(long, required_unless_present = "no_password", conflicts_with = "no_password")]
        password: Option<String>,

        /// Let the server generate the initial password
        #[arg(long)]
        no_password: bool,

        /// Tags as key=value pairs
        #[arg(long, value_delimiter = ',')]
        tags: Vec<String>,
    },

    /// Delete a user
    Delete {
        /// User id
        user_id: String,
    },
}

/// Image class an image command operates on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ImageType {
    /// Account-wide base images
    Guest,
    /// Images owned by the calling user
    User,
}

impl ImageType {
    pub fn path_segment(&self) -> &'static str {
        match self {
            ImageType::Guest => "guest",
            ImageType::User => "user",
        }
    }
}
