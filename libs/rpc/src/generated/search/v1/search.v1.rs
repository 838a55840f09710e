// @generated
// This file is @generated by prost-build.
#[derive(Clone, PartialEq, Eq, Hash, ::prost::Message)]
pub struct DocCountRequest {
    #[prost(string, tag = "1")]
    pub index_name: ::prost::alloc::string::String,
    #[prost(string, tag = "2")]
    pub index_uuid: ::prost::alloc::string::String,
}
#[derive(Clone, Copy, PartialEq, Eq, Hash, ::prost::Message)]
pub struct DocCountResponse {
    #[prost(int64, tag = "1")]
    pub doc_count: i64,
}
#[derive(Clone, PartialEq, Eq, Hash, ::prost::Message)]
pub struct SearchRequest {
    #[prost(string, tag = "1")]
    pub index_name: ::prost::alloc::string::String,
    #[prost(string, tag = "2")]
    pub index_uuid: ::prost::alloc::string::String,
    /// JSON-encoded query body.
    #[prost(bytes = "vec", tag = "3")]
    pub contents: ::prost::alloc::vec::Vec<u8>,
    #[prost(bool, tag = "4")]
    pub stream: bool,
}
#[derive(Clone, PartialEq, Eq, Hash, ::prost::Message)]
pub struct SearchResult {
    #[prost(oneof = "search_result::Contents", tags = "1, 2")]
    pub contents: ::core::option::Option<search_result::Contents>,
}
/// Nested message and enum types in `SearchResult`.
pub mod search_result {
    #[derive(Clone, PartialEq, Eq, Hash, ::prost::Message)]
    pub struct Hits {
        /// JSON-encoded hit documents.
        #[prost(bytes = "vec", tag = "1")]
        pub bytes: ::prost::alloc::vec::Vec<u8>,
        #[prost(uint64, tag = "2")]
        pub total: u64,
    }
    #[derive(Clone, PartialEq, Eq, Hash, ::prost::Oneof)]
    pub enum Contents {
        #[prost(message, tag = "1")]
        Hits(Hits),
        /// JSON-encoded final search result summary.
        #[prost(bytes, tag = "2")]
        SearchResult(::prost::alloc::vec::Vec<u8>),
    }
}
