use std::fs::File;
use std::io::Read;
use std::path::Path;

use crate::api::schema::*;
use crate::error::handler::*;

// read the 'image set config' file
pub fn load_config(dir: String) -> Result<String, MirrorError> {
    let path = Path::new(&dir);
    let mut file = File::open(path)
        .map_err(|err| MirrorError::new(&format!("couldn't open {}: {}", dir, err)))?;

    let mut s = String::new();
    file.read_to_string(&mut s)?;
    Ok(s)
}

// parse the 'image set config' file
pub fn parse_yaml_config(data: String) -> Result<ImageSetConfig, MirrorError> {
    let res = serde_yaml::from_str::<ImageSetConfig>(&data)?;
    Ok(res)
}
