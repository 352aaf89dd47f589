use std::{
    fs::File,
    io::{BufReader, BufWriter, Read, Write},
    path::Path,
};

use ark_serialize::{CanonicalDeserialize, CanonicalSerialize};

fn create_file(path: &Path) -> Result<File, std::io::Error> {
    // Create parent directories if they don't exist
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    File::create(path)
}

/// JSON persistence for artifacts and configuration.
pub trait Serializable {
    fn serialize_to_file(&self, path: &Path) -> Result<(), std::io::Error>;
    fn deserialize_from_file(path: &Path) -> Result<Self, std::io::Error>
    where
        Self: Sized;
}

impl<T> Serializable for T
where
    T: serde::Serialize + serde::de::DeserializeOwned,
{
    fn serialize_to_file(&self, path: &Path) -> Result<(), std::io::Error> {
        let mut file = create_file(path)?;
        let serialized = serde_json::to_string_pretty(self)?;
        file.write_all(serialized.as_bytes())?;
        Ok(())
    }

    fn deserialize_from_file(path: &Path) -> Result<Self, std::io::Error> {
        let mut file = File::open(path)?;
        let mut contents = String::new();
        file.read_to_string(&mut contents)?;
        let value: T = serde_json::from_str(&contents)?;
        Ok(value)
    }
}

/// Binary persistence for arkworks-encoded values (keys, SRS).
/// Reads always run the full validity checks (on-curve, subgroup).
pub trait CanonicalFile {
    fn write_to_file(&self, path: &Path) -> Result<(), std::io::Error>;
    fn read_from_file(path: &Path) -> Result<Self, std::io::Error>
    where
        Self: Sized;
}

impl<T> CanonicalFile for T
where
    T: CanonicalSerialize + CanonicalDeserialize,
{
    fn write_to_file(&self, path: &Path) -> Result<(), std::io::Error> {
        let mut writer = BufWriter::new(create_file(path)?);
        self.serialize_compressed(&mut writer)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
        writer.flush()
    }

    fn read_from_file(path: &Path) -> Result<Self, std::io::Error> {
        let reader = BufReader::new(File::open(path)?);
        T::deserialize_compressed(reader)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))
    }
}
