//! Native ("image") side of a snapshot: address spaces, the process, native
//! threads and memory sections.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::{Access, AddressSpaceId};

/// An address inside one address space of the image.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImagePointer {
    pub address: u64,
    pub address_space: AddressSpaceId,
    #[serde(default = "crate::not_captured")]
    pub executable: Access<bool>,
    #[serde(default = "crate::not_captured")]
    pub read_only: Access<bool>,
    #[serde(default = "crate::not_captured")]
    pub shared: Access<bool>,
}

impl ImagePointer {
    /// Pointer with every flag readable and false.
    pub fn plain(address_space: AddressSpaceId, address: u64) -> Self {
        Self {
            address,
            address_space,
            executable: Ok(false),
            read_only: Ok(false),
            shared: Ok(false),
        }
    }

    pub fn sort_key(&self) -> (AddressSpaceId, u64) {
        (self.address_space, self.address)
    }
}

/// A contiguous memory range with a name (heap region, code cache block,
/// bytecode range, ...).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageSection {
    #[serde(default = "crate::not_captured")]
    pub name: Access<String>,
    pub base: ImagePointer,
    #[serde(default = "crate::not_captured")]
    pub size: Access<u64>,
    #[serde(default = "crate::not_captured")]
    pub executable: Access<bool>,
    #[serde(default = "crate::not_captured")]
    pub read_only: Access<bool>,
    #[serde(default = "crate::not_captured")]
    pub shared: Access<bool>,
}

impl ImageSection {
    pub fn name_contains(&self, needle: &str) -> bool {
        matches!(&self.name, Ok(n) if n.contains(needle))
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageAddressSpace {
    pub id: AddressSpaceId,
    #[serde(default = "crate::not_captured")]
    pub name: Access<String>,
    #[serde(default = "crate::not_captured")]
    pub pointer_size: Access<u32>,
    #[serde(default = "crate::not_captured")]
    pub sections: Access<Vec<ImageSection>>,
    /// Id of the process living in this address space, if any. This is the
    /// back-reference edge from an address space into the process graph.
    #[serde(default = "crate::not_captured")]
    pub process: Access<Option<String>>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageProcess {
    #[serde(default = "crate::not_captured")]
    pub id: Access<String>,
    #[serde(default = "crate::not_captured")]
    pub command_line: Access<String>,
    #[serde(default = "crate::not_captured")]
    pub environment: Access<BTreeMap<String, String>>,
    #[serde(default = "crate::not_captured")]
    pub pointer_size: Access<u32>,
    pub address_space: AddressSpaceId,
    #[serde(default = "crate::not_captured")]
    pub threads: Access<Vec<ImageThread>>,
}

/// A native thread of the process.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageThread {
    #[serde(default = "crate::not_captured")]
    pub id: Access<String>,
    #[serde(default = "crate::not_captured")]
    pub properties: Access<BTreeMap<String, String>>,
    #[serde(default = "crate::not_captured")]
    pub registers: Access<BTreeMap<String, u64>>,
    #[serde(default = "crate::not_captured")]
    pub stack_frames: Access<Vec<ImageStackFrame>>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageStackFrame {
    #[serde(default = "crate::not_captured")]
    pub procedure_address: Access<ImagePointer>,
    #[serde(default = "crate::not_captured")]
    pub procedure_name: Access<String>,
    #[serde(default = "crate::not_captured")]
    pub base_pointer: Access<ImagePointer>,
}
