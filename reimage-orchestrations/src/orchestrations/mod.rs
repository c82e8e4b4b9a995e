pub mod delete_instance;
pub mod flows;
pub mod get_disk;
pub mod replace_instance;

pub use delete_instance::delete_instance_orchestration;
pub use get_disk::get_disk_orchestration;
pub use replace_instance::replace_instance_orchestration;
