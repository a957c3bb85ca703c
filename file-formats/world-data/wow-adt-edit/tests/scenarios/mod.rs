mod errors;
mod layout;
mod version_specific;
