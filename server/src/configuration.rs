use pavex::config::ConfigProfile;

/// The configuration profile, i.e. a way to determine which set of
/// configuration values should be used.
#[derive(ConfigProfile, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Profile {
    Dev,
    Test,
    Prod,
}
