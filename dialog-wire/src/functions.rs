//! RPC functions. Each request type names its method path and the response
//! type the server answers with.

use crate::RemoteCall;

pub mod messaging {
    use crate::enums::{ListLoadMode, UpdateOptimization};
    use crate::types::{MessageContent, OutPeer, ResponseLoadHistory, ResponseSeqDateMid, ResponseVoid};

    wire_struct! {
        /// Send a message to `peer`. `rid` deduplicates retransmissions.
        pub struct SendMessage = 0x3b5e0c21 {
            pub peer:             OutPeer,
            pub rid:              i64,
            pub message:          MessageContent,
            /// When set, the message is visible only to this user.
            pub is_only_for_user: Option<i32>,
        }
    }

    impl super::RemoteCall for SendMessage {
        type Return = ResponseSeqDateMid;
        const METHOD: &'static str = "/dialog.Messaging/SendMessage";
    }

    wire_struct! {
        /// Load a page of history around `date`.
        pub struct LoadHistory = 0x1d4f8a93 {
            pub peer:          OutPeer,
            pub date:          i64,
            pub load_mode:     ListLoadMode,
            pub limit:         i32,
            pub optimizations: Vec<UpdateOptimization>,
        }
    }

    impl super::RemoteCall for LoadHistory {
        type Return = ResponseLoadHistory;
        const METHOD: &'static str = "/dialog.Messaging/LoadHistory";
    }

    wire_struct! {
        /// Mark every message in `peer` up to `date` as read.
        pub struct MessageRead = 0x52c7e3f8 {
            pub peer: OutPeer,
            pub date: i64,
        }
    }

    impl super::RemoteCall for MessageRead {
        type Return = ResponseVoid;
        const METHOD: &'static str = "/dialog.Messaging/MessageRead";
    }
}

pub mod media_and_files {
    use crate::types::{FileLocation, ResponseGetFileUrl};

    wire_struct! {
        /// Ask for a time-limited download URL for `file`.
        pub struct GetFileUrl = 0x6d83b2a5 {
            pub file: FileLocation,
        }
    }

    impl super::RemoteCall for GetFileUrl {
        type Return = ResponseGetFileUrl;
        const METHOD: &'static str = "/dialog.MediaAndFiles/GetFileUrl";
    }
}
