// @generated
// This file wires up buf-generated protobuf code for the search node API.

pub mod search {
    pub mod v1 {
        include!("generated/search/v1/search.v1.rs");
        include!("generated/search/v1/search.v1.tonic.rs");
    }
}
