pub mod vm;
pub mod image;
pub mod keys;
pub mod network;
pub mod kube;
pub mod identity;

pub use vm::handle_vm_command;
pub use image::handle_image_command;
pub use keys::handle_keys_command;
pub use network::handle_network_command;
pub use kube::handle_kube_command;
pub use identity::handle_identity_command;
