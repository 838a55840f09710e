use crate::channel::MessageLimits;
use crate::credentials::CallCredentials;
use crate::pool::PooledChannel;
use rpc::search::v1::search_service_client::SearchServiceClient;
use tonic::service::interceptor::InterceptedService;
use tonic::transport::Channel;

/// Search service client bound to one pooled channel.
///
/// Every call passes through the pool's [`CallCredentials`], so requests
/// carry the `authorization` entry when the host resolved to credentials.
pub type SearchClient = SearchServiceClient<InterceptedService<Channel, CallCredentials>>;

/// Wrap a raw channel in a typed search client.
///
/// Pure adaptation: no I/O happens here, and the returned client shares the
/// channel's underlying connection.
///
/// ## Example
/// ```ignore
/// use search_rpc_client::client::wrap;
///
/// let client = wrap(channel, CallCredentials::none(), options.message_limits());
/// let count = client.doc_count(request).await?;
/// ```
pub fn wrap(channel: Channel, credentials: CallCredentials, limits: MessageLimits) -> SearchClient {
    SearchServiceClient::with_interceptor(channel, credentials)
        .max_decoding_message_size(limits.max_decoding_message_size)
        .max_encoding_message_size(limits.max_encoding_message_size)
}

/// Typed client for a channel checked out of a pool
pub fn from_pooled(pooled: &PooledChannel) -> SearchClient {
    let options = pooled.options();
    wrap(
        pooled.channel().clone(),
        options.credentials.clone(),
        options.message_limits(),
    )
}
