use serde::Deserialize;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Container engine binary.
    pub docker: String,
    pub prod_image: String,
    pub dev_image: String,
    /// Build context of the prod image, relative to the working directory.
    pub prod_context: String,
    /// Build context of the dev image. The dev image is built `FROM` prod.
    pub dev_context: String,
    /// In-container path the working directory is mounted at.
    pub mount: String,
    /// Engine control socket, mounted through for `run` only.
    pub socket: String,
    /// Run containers as the invoking user rather than the image default.
    pub as_user: bool,
    pub test_command: String,
    pub flake_command: String,
    pub doc_command: String,
    pub notebook_command: String,
    pub notebook_name: String,
    pub notebook_delay_ms: u64,
    pub copyright_root: String,
    pub copyright_suffix: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            docker: "docker".to_string(),
            prod_image: "lmchallenge".to_string(),
            dev_image: "lmchallenge-dev".to_string(),
            prod_context: ".".to_string(),
            dev_context: "docker/dev".to_string(),
            mount: "/work".to_string(),
            socket: "/var/run/docker.sock".to_string(),
            as_user: false,
            test_command: "./scripts/run_tests.sh".to_string(),
            flake_command: "flake8".to_string(),
            doc_command: "./scripts/build_docs.sh".to_string(),
            notebook_command: "jupyter notebook --allow-root --ip 0.0.0.0 --port {port}"
                .to_string(),
            notebook_name: "lmchallenge-notebook".to_string(),
            notebook_delay_ms: 1000,
            copyright_root: "lmchallenge".to_string(),
            copyright_suffix: ".py".to_string(),
        }
    }
}
