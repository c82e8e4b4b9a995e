use clap::{ArgGroup, Parser, Subcommand};

/// Reimage - replace a cloud instance in place with a freshly built image
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    #[command(subcommand)]
    pub mode: Mode,
}

#[derive(Subcommand, Debug)]
pub enum Mode {
    /// Stop an instance and bring up a clone booted from a new image
    #[command(group(
        ArgGroup::new("source")
            .required(true)
            .args(["tarball", "disk", "from_boot_disk"])
    ))]
    Replace {
        /// Name (prefix) of the running instance to replace
        identifier: String,

        /// Image tarball in object storage (gs://bucket/object, bucket/object or URL)
        #[arg(long)]
        tarball: Option<String>,

        /// Existing disk to build the image from
        #[arg(long)]
        disk: Option<String>,

        /// Build the image from the instance's own boot disk
        #[arg(long)]
        from_boot_disk: bool,

        /// Boot disk size of the new instance in GB
        #[arg(long)]
        disk_size: i64,

        /// Regex the instance's joined tags must match
        #[arg(long)]
        tag: Option<String>,

        /// External address to bind to the new instance
        #[arg(long)]
        address: Option<String>,

        /// Output format
        #[arg(short, long, default_value = "table")]
        output: String,
    },

    /// Delete an instance by name
    Delete {
        /// Exact instance name
        identifier: String,
    },

    /// Show the disk matching an identifier
    Disk {
        /// Name (prefix) of the disk
        identifier: String,

        /// Output format
        #[arg(short, long, default_value = "table")]
        output: String,
    },

    /// Show the running instance a replace would act on
    Find {
        /// Name (prefix) of the instance
        identifier: String,

        /// Regex the instance's joined tags must match
        #[arg(long)]
        tag: Option<String>,

        /// Output format
        #[arg(short, long, default_value = "table")]
        output: String,
    },

    /// Print an orchestration flow as a Mermaid diagram
    Flow {
        /// Orchestration name (full or short)
        #[arg(default_value = "replace-instance")]
        name: String,
    },
}
