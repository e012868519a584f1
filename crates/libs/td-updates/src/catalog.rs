//! The update catalog: one declaration per upstream `update*` constructor.
//!
//! [`update_catalog!`] expands each declaration into a payload struct, an arm
//! of [`Update`] and [`UpdateTag`], and a static [`DecodeRule`] so that the
//! narrower stays a single table-driven algorithm.

use crate::authorization::AuthorizationState;
use crate::registry::DecodeRule;
use crate::shape::{FieldFault, FieldRule, TdField, TdInt64, TdObject};
use serde::{Deserialize, Serialize};
use serde_json::{Map as JsonMap, Value as JsonValue};
use std::fmt;

/// Implemented by every generated payload struct.
pub trait CatalogPayload: Sized {
    const TAG: UpdateTag;
    const FIELDS: &'static [FieldRule];

    fn from_fields(fields: &JsonMap<String, JsonValue>) -> Result<Self, FieldFault>;

    fn into_update(self) -> Update;
}

pub(crate) fn build_update<P: CatalogPayload>(
    fields: &JsonMap<String, JsonValue>,
) -> Result<Update, FieldFault> {
    P::from_fields(fields).map(P::into_update)
}

macro_rules! wire_name {
    ($field:ident, $wire:literal) => {
        $wire
    };
    ($field:ident) => {
        stringify!($field)
    };
}

macro_rules! update_catalog {
    (
        $(
            $variant:ident($payload:ident) = $tag:literal {
                $( $(#[wire = $wire:literal])? $field:ident : $ty:ty ),* $(,)?
            }
        ),+ $(,)?
    ) => {
        $(
            #[doc = concat!("Payload of `", $tag, "`.")]
            #[derive(Clone, Debug, PartialEq, Serialize)]
            pub struct $payload {
                $(
                    $( #[serde(rename = $wire)] )?
                    pub $field: $ty,
                )*
            }

            impl CatalogPayload for $payload {
                const TAG: UpdateTag = UpdateTag::$variant;
                const FIELDS: &'static [FieldRule] = &[
                    $(
                        FieldRule {
                            name: wire_name!($field $(, $wire)?),
                            shape: <$ty as TdField>::SHAPE,
                            optional: <$ty as TdField>::OPTIONAL,
                        },
                    )*
                ];

                #[allow(unused_variables)]
                fn from_fields(fields: &JsonMap<String, JsonValue>) -> Result<Self, FieldFault> {
                    Ok(Self {
                        $(
                            $field: <$ty as TdField>::decode_field(
                                fields,
                                wire_name!($field $(, $wire)?),
                            )?,
                        )*
                    })
                }

                fn into_update(self) -> Update {
                    Update::$variant(self)
                }
            }
        )+

        /// Discriminator of every update kind known to this catalog.
        #[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub enum UpdateTag {
            $(
                #[serde(rename = $tag)]
                $variant,
            )+
        }

        impl UpdateTag {
            /// All tags, in catalog order.
            pub const ALL: &'static [UpdateTag] = &[ $( UpdateTag::$variant, )+ ];

            pub fn as_str(self) -> &'static str {
                match self {
                    $( UpdateTag::$variant => $tag, )+
                }
            }

            pub fn from_name(name: &str) -> Option<Self> {
                match name {
                    $( $tag => Some(UpdateTag::$variant), )+
                    _ => None,
                }
            }
        }

        /// A narrowed update. Exactly one arm per catalog tag.
        #[derive(Clone, Debug, PartialEq, Serialize)]
        #[serde(tag = "@type")]
        pub enum Update {
            $(
                #[serde(rename = $tag)]
                $variant($payload),
            )+
        }

        impl Update {
            pub fn tag(&self) -> UpdateTag {
                match self {
                    $( Update::$variant(_) => UpdateTag::$variant, )+
                }
            }
        }

        pub(crate) static CATALOG: &[DecodeRule] = &[
            $(
                DecodeRule::new(
                    UpdateTag::$variant,
                    <$payload as CatalogPayload>::FIELDS,
                    build_update::<$payload>,
                ),
            )+
        ];
    };
}

impl UpdateTag {
    /// Reference page of the constructor in the upstream API documentation.
    pub fn documentation_url(self) -> String {
        let mut snake = String::with_capacity(self.as_str().len() + 8);
        for (index, ch) in self.as_str().chars().enumerate() {
            if ch.is_ascii_uppercase() && index != 0 {
                snake.push('_');
            }
            snake.push(ch.to_ascii_lowercase());
        }
        format!("https://core.telegram.org/tdlib/docs/classtd_1_1td__api_1_1{snake}.html")
    }
}

impl fmt::Display for UpdateTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Update {
    pub fn as_authorization_state(&self) -> Option<&UpdateAuthorizationState> {
        match self {
            Update::AuthorizationState(update) => Some(update),
            _ => None,
        }
    }

    pub fn to_value(&self) -> serde_json::Result<JsonValue> {
        serde_json::to_value(self)
    }
}

update_catalog! {
    // Messages
    AuthorizationState(UpdateAuthorizationState) = "updateAuthorizationState" {
        authorization_state: AuthorizationState,
    },
    NewMessage(UpdateNewMessage) = "updateNewMessage" {
        message: TdObject,
    },
    MessageSendAcknowledged(UpdateMessageSendAcknowledged) = "updateMessageSendAcknowledged" {
        chat_id: i64,
        message_id: i64,
    },
    MessageSendSucceeded(UpdateMessageSendSucceeded) = "updateMessageSendSucceeded" {
        message: TdObject,
        old_message_id: i64,
    },
    MessageSendFailed(UpdateMessageSendFailed) = "updateMessageSendFailed" {
        message: TdObject,
        old_message_id: i64,
        error: TdObject,
    },
    MessageContent(UpdateMessageContent) = "updateMessageContent" {
        chat_id: i64,
        message_id: i64,
        new_content: TdObject,
    },
    MessageEdited(UpdateMessageEdited) = "updateMessageEdited" {
        chat_id: i64,
        message_id: i64,
        edit_date: i32,
        reply_markup: Option<TdObject>,
    },
    MessageIsPinned(UpdateMessageIsPinned) = "updateMessageIsPinned" {
        chat_id: i64,
        message_id: i64,
        is_pinned: bool,
    },
    MessageInteractionInfo(UpdateMessageInteractionInfo) = "updateMessageInteractionInfo" {
        chat_id: i64,
        message_id: i64,
        interaction_info: Option<TdObject>,
    },
    MessageContentOpened(UpdateMessageContentOpened) = "updateMessageContentOpened" {
        chat_id: i64,
        message_id: i64,
    },
    MessageMentionRead(UpdateMessageMentionRead) = "updateMessageMentionRead" {
        chat_id: i64,
        message_id: i64,
        unread_mention_count: i32,
    },
    MessageUnreadReactions(UpdateMessageUnreadReactions) = "updateMessageUnreadReactions" {
        chat_id: i64,
        message_id: i64,
        unread_reactions: Vec<TdObject>,
        unread_reaction_count: i32,
    },
    MessageFactCheck(UpdateMessageFactCheck) = "updateMessageFactCheck" {
        chat_id: i64,
        message_id: i64,
        fact_check: TdObject,
    },
    MessageLiveLocationViewed(UpdateMessageLiveLocationViewed) = "updateMessageLiveLocationViewed" {
        chat_id: i64,
        message_id: i64,
    },
    VideoPublished(UpdateVideoPublished) = "updateVideoPublished" {
        chat_id: i64,
        message_id: i64,
    },

    // Chats
    NewChat(UpdateNewChat) = "updateNewChat" {
        chat: TdObject,
    },
    ChatTitle(UpdateChatTitle) = "updateChatTitle" {
        chat_id: i64,
        title: String,
    },
    ChatPhoto(UpdateChatPhoto) = "updateChatPhoto" {
        chat_id: i64,
        photo: Option<TdObject>,
    },
    ChatAccentColors(UpdateChatAccentColors) = "updateChatAccentColors" {
        chat_id: i64,
        accent_color_id: i32,
        background_custom_emoji_id: TdInt64,
        profile_accent_color_id: i32,
        profile_background_custom_emoji_id: TdInt64,
    },
    ChatPermissions(UpdateChatPermissions) = "updateChatPermissions" {
        chat_id: i64,
        permissions: TdObject,
    },
    ChatLastMessage(UpdateChatLastMessage) = "updateChatLastMessage" {
        chat_id: i64,
        last_message: Option<TdObject>,
        positions: Vec<TdObject>,
    },
    ChatPosition(UpdateChatPosition) = "updateChatPosition" {
        chat_id: i64,
        position: TdObject,
    },
    ChatAddedToList(UpdateChatAddedToList) = "updateChatAddedToList" {
        chat_id: i64,
        chat_list: TdObject,
    },
    ChatRemovedFromList(UpdateChatRemovedFromList) = "updateChatRemovedFromList" {
        chat_id: i64,
        chat_list: TdObject,
    },
    ChatReadInbox(UpdateChatReadInbox) = "updateChatReadInbox" {
        chat_id: i64,
        last_read_inbox_message_id: i64,
        unread_count: i32,
    },
    ChatReadOutbox(UpdateChatReadOutbox) = "updateChatReadOutbox" {
        chat_id: i64,
        last_read_outbox_message_id: i64,
    },
    ChatActionBar(UpdateChatActionBar) = "updateChatActionBar" {
        chat_id: i64,
        action_bar: Option<TdObject>,
    },
    ChatBusinessBotManageBar(UpdateChatBusinessBotManageBar) = "updateChatBusinessBotManageBar" {
        chat_id: i64,
        business_bot_manage_bar: Option<TdObject>,
    },
    ChatAvailableReactions(UpdateChatAvailableReactions) = "updateChatAvailableReactions" {
        chat_id: i64,
        available_reactions: TdObject,
    },
    ChatDraftMessage(UpdateChatDraftMessage) = "updateChatDraftMessage" {
        chat_id: i64,
        draft_message: Option<TdObject>,
        positions: Vec<TdObject>,
    },
    ChatEmojiStatus(UpdateChatEmojiStatus) = "updateChatEmojiStatus" {
        chat_id: i64,
        emoji_status: Option<TdObject>,
    },
    ChatMessageSender(UpdateChatMessageSender) = "updateChatMessageSender" {
        chat_id: i64,
        message_sender_id: Option<TdObject>,
    },
    ChatMessageAutoDeleteTime(UpdateChatMessageAutoDeleteTime) = "updateChatMessageAutoDeleteTime" {
        chat_id: i64,
        message_auto_delete_time: i32,
    },
    ChatNotificationSettings(UpdateChatNotificationSettings) = "updateChatNotificationSettings" {
        chat_id: i64,
        notification_settings: TdObject,
    },
    ChatPendingJoinRequests(UpdateChatPendingJoinRequests) = "updateChatPendingJoinRequests" {
        chat_id: i64,
        pending_join_requests: Option<TdObject>,
    },
    ChatReplyMarkup(UpdateChatReplyMarkup) = "updateChatReplyMarkup" {
        chat_id: i64,
        reply_markup_message_id: i64,
    },
    ChatBackground(UpdateChatBackground) = "updateChatBackground" {
        chat_id: i64,
        background: Option<TdObject>,
    },
    ChatTheme(UpdateChatTheme) = "updateChatTheme" {
        chat_id: i64,
        theme_name: String,
    },
    ChatUnreadMentionCount(UpdateChatUnreadMentionCount) = "updateChatUnreadMentionCount" {
        chat_id: i64,
        unread_mention_count: i32,
    },
    ChatUnreadReactionCount(UpdateChatUnreadReactionCount) = "updateChatUnreadReactionCount" {
        chat_id: i64,
        unread_reaction_count: i32,
    },
    ChatVideoChat(UpdateChatVideoChat) = "updateChatVideoChat" {
        chat_id: i64,
        video_chat: TdObject,
    },
    ChatDefaultDisableNotification(UpdateChatDefaultDisableNotification) = "updateChatDefaultDisableNotification" {
        chat_id: i64,
        default_disable_notification: bool,
    },
    ChatHasProtectedContent(UpdateChatHasProtectedContent) = "updateChatHasProtectedContent" {
        chat_id: i64,
        has_protected_content: bool,
    },
    ChatIsTranslatable(UpdateChatIsTranslatable) = "updateChatIsTranslatable" {
        chat_id: i64,
        is_translatable: bool,
    },
    ChatIsMarkedAsUnread(UpdateChatIsMarkedAsUnread) = "updateChatIsMarkedAsUnread" {
        chat_id: i64,
        is_marked_as_unread: bool,
    },
    ChatViewAsTopics(UpdateChatViewAsTopics) = "updateChatViewAsTopics" {
        chat_id: i64,
        view_as_topics: bool,
    },
    ChatBlockList(UpdateChatBlockList) = "updateChatBlockList" {
        chat_id: i64,
        block_list: Option<TdObject>,
    },
    ChatHasScheduledMessages(UpdateChatHasScheduledMessages) = "updateChatHasScheduledMessages" {
        chat_id: i64,
        has_scheduled_messages: bool,
    },
    ChatFolders(UpdateChatFolders) = "updateChatFolders" {
        chat_folders: Vec<TdObject>,
        main_chat_list_position: i32,
        are_tags_enabled: bool,
    },
    ChatOnlineMemberCount(UpdateChatOnlineMemberCount) = "updateChatOnlineMemberCount" {
        chat_id: i64,
        online_member_count: i32,
    },

    // Topics and shortcuts
    SavedMessagesTopic(UpdateSavedMessagesTopic) = "updateSavedMessagesTopic" {
        topic: TdObject,
    },
    SavedMessagesTopicCount(UpdateSavedMessagesTopicCount) = "updateSavedMessagesTopicCount" {
        topic_count: i32,
    },
    DirectMessagesChatTopic(UpdateDirectMessagesChatTopic) = "updateDirectMessagesChatTopic" {
        topic: TdObject,
    },
    TopicMessageCount(UpdateTopicMessageCount) = "updateTopicMessageCount" {
        chat_id: i64,
        topic_id: TdObject,
        message_count: i32,
    },
    QuickReplyShortcut(UpdateQuickReplyShortcut) = "updateQuickReplyShortcut" {
        shortcut: TdObject,
    },
    QuickReplyShortcutDeleted(UpdateQuickReplyShortcutDeleted) = "updateQuickReplyShortcutDeleted" {
        shortcut_id: i32,
    },
    QuickReplyShortcuts(UpdateQuickReplyShortcuts) = "updateQuickReplyShortcuts" {
        shortcut_ids: Vec<i32>,
    },
    QuickReplyShortcutMessages(UpdateQuickReplyShortcutMessages) = "updateQuickReplyShortcutMessages" {
        shortcut_id: i32,
        messages: Vec<TdObject>,
    },
    ForumTopicInfo(UpdateForumTopicInfo) = "updateForumTopicInfo" {
        info: TdObject,
    },
    ForumTopic(UpdateForumTopic) = "updateForumTopic" {
        chat_id: i64,
        message_thread_id: i64,
        is_pinned: bool,
        last_read_inbox_message_id: i64,
        last_read_outbox_message_id: i64,
        unread_mention_count: i32,
        unread_reaction_count: i32,
        notification_settings: TdObject,
    },

    // Notifications
    ScopeNotificationSettings(UpdateScopeNotificationSettings) = "updateScopeNotificationSettings" {
        scope: TdObject,
        notification_settings: TdObject,
    },
    ReactionNotificationSettings(UpdateReactionNotificationSettings) = "updateReactionNotificationSettings" {
        notification_settings: TdObject,
    },
    Notification(UpdateNotification) = "updateNotification" {
        notification_group_id: i32,
        notification: TdObject,
    },
    NotificationGroup(UpdateNotificationGroup) = "updateNotificationGroup" {
        notification_group_id: i32,
        #[wire = "type"] kind: TdObject,
        chat_id: i64,
        notification_settings_chat_id: i64,
        notification_sound_id: TdInt64,
        total_count: i32,
        added_notifications: Vec<TdObject>,
        removed_notification_ids: Vec<i32>,
    },
    ActiveNotifications(UpdateActiveNotifications) = "updateActiveNotifications" {
        groups: Vec<TdObject>,
    },
    HavePendingNotifications(UpdateHavePendingNotifications) = "updateHavePendingNotifications" {
        have_delayed_notifications: bool,
        have_unreceived_notifications: bool,
    },
    DeleteMessages(UpdateDeleteMessages) = "updateDeleteMessages" {
        chat_id: i64,
        message_ids: Vec<i64>,
        is_permanent: bool,
        from_cache: bool,
    },
    ChatAction(UpdateChatAction) = "updateChatAction" {
        chat_id: i64,
        topic_id: Option<TdObject>,
        sender_id: TdObject,
        action: TdObject,
    },

    // Users and groups
    UserStatus(UpdateUserStatus) = "updateUserStatus" {
        user_id: i64,
        status: TdObject,
    },
    User(UpdateUser) = "updateUser" {
        user: TdObject,
    },
    BasicGroup(UpdateBasicGroup) = "updateBasicGroup" {
        basic_group: TdObject,
    },
    Supergroup(UpdateSupergroup) = "updateSupergroup" {
        supergroup: TdObject,
    },
    SecretChat(UpdateSecretChat) = "updateSecretChat" {
        secret_chat: TdObject,
    },
    UserFullInfo(UpdateUserFullInfo) = "updateUserFullInfo" {
        user_id: i64,
        user_full_info: TdObject,
    },
    BasicGroupFullInfo(UpdateBasicGroupFullInfo) = "updateBasicGroupFullInfo" {
        basic_group_id: i64,
        basic_group_full_info: TdObject,
    },
    SupergroupFullInfo(UpdateSupergroupFullInfo) = "updateSupergroupFullInfo" {
        supergroup_id: i64,
        supergroup_full_info: TdObject,
    },
    ServiceNotification(UpdateServiceNotification) = "updateServiceNotification" {
        #[wire = "type"] kind: String,
        content: TdObject,
    },

    // Files
    File(UpdateFile) = "updateFile" {
        file: TdObject,
    },
    FileGenerationStart(UpdateFileGenerationStart) = "updateFileGenerationStart" {
        generation_id: TdInt64,
        original_path: String,
        destination_path: String,
        conversion: String,
    },
    FileGenerationStop(UpdateFileGenerationStop) = "updateFileGenerationStop" {
        generation_id: TdInt64,
    },
    FileDownloads(UpdateFileDownloads) = "updateFileDownloads" {
        total_size: i64,
        total_count: i32,
        downloaded_size: i64,
    },
    FileAddedToDownloads(UpdateFileAddedToDownloads) = "updateFileAddedToDownloads" {
        file_download: TdObject,
        counts: TdObject,
    },
    FileDownload(UpdateFileDownload) = "updateFileDownload" {
        file_id: i32,
        complete_date: i32,
        is_paused: bool,
        counts: TdObject,
    },
    FileRemovedFromDownloads(UpdateFileRemovedFromDownloads) = "updateFileRemovedFromDownloads" {
        file_id: i32,
        counts: TdObject,
    },
    ApplicationVerificationRequired(UpdateApplicationVerificationRequired) = "updateApplicationVerificationRequired" {
        verification_id: i64,
        nonce: String,
        cloud_project_number: TdInt64,
    },
    ApplicationRecaptchaVerificationRequired(UpdateApplicationRecaptchaVerificationRequired) = "updateApplicationRecaptchaVerificationRequired" {
        verification_id: i64,
        action: String,
        recaptcha_key_id: String,
    },

    // Calls
    Call(UpdateCall) = "updateCall" {
        call: TdObject,
    },
    GroupCall(UpdateGroupCall) = "updateGroupCall" {
        group_call: TdObject,
    },
    GroupCallParticipant(UpdateGroupCallParticipant) = "updateGroupCallParticipant" {
        group_call_id: i32,
        participant: TdObject,
    },
    GroupCallParticipants(UpdateGroupCallParticipants) = "updateGroupCallParticipants" {
        group_call_id: i32,
        participant_user_ids: Vec<TdInt64>,
    },
    GroupCallVerificationState(UpdateGroupCallVerificationState) = "updateGroupCallVerificationState" {
        group_call_id: i32,
        generation: i32,
        emojis: Vec<String>,
    },
    NewCallSignalingData(UpdateNewCallSignalingData) = "updateNewCallSignalingData" {
        call_id: i32,
        data: String,
    },

    // Counters, privacy and stories
    UserPrivacySettingRules(UpdateUserPrivacySettingRules) = "updateUserPrivacySettingRules" {
        setting: TdObject,
        rules: TdObject,
    },
    UnreadMessageCount(UpdateUnreadMessageCount) = "updateUnreadMessageCount" {
        chat_list: TdObject,
        unread_count: i32,
        unread_unmuted_count: i32,
    },
    UnreadChatCount(UpdateUnreadChatCount) = "updateUnreadChatCount" {
        chat_list: TdObject,
        total_count: i32,
        unread_count: i32,
        unread_unmuted_count: i32,
        marked_as_unread_count: i32,
        marked_as_unread_unmuted_count: i32,
    },
    Story(UpdateStory) = "updateStory" {
        story: TdObject,
    },
    StoryDeleted(UpdateStoryDeleted) = "updateStoryDeleted" {
        story_poster_chat_id: i64,
        story_id: i32,
    },
    StoryPostSucceeded(UpdateStoryPostSucceeded) = "updateStoryPostSucceeded" {
        story: TdObject,
        old_story_id: i32,
    },
    StoryPostFailed(UpdateStoryPostFailed) = "updateStoryPostFailed" {
        story: TdObject,
        error: TdObject,
        error_type: Option<TdObject>,
    },
    ChatActiveStories(UpdateChatActiveStories) = "updateChatActiveStories" {
        active_stories: TdObject,
    },
    StoryListChatCount(UpdateStoryListChatCount) = "updateStoryListChatCount" {
        story_list: TdObject,
        chat_count: i32,
    },
    StoryStealthMode(UpdateStoryStealthMode) = "updateStoryStealthMode" {
        active_until_date: i32,
        cooldown_until_date: i32,
    },

    // Options, stickers and appearance
    Option(UpdateOption) = "updateOption" {
        name: String,
        value: TdObject,
    },
    StickerSet(UpdateStickerSet) = "updateStickerSet" {
        sticker_set: TdObject,
    },
    InstalledStickerSets(UpdateInstalledStickerSets) = "updateInstalledStickerSets" {
        sticker_type: TdObject,
        sticker_set_ids: Vec<TdInt64>,
    },
    TrendingStickerSets(UpdateTrendingStickerSets) = "updateTrendingStickerSets" {
        sticker_type: TdObject,
        sticker_sets: TdObject,
    },
    RecentStickers(UpdateRecentStickers) = "updateRecentStickers" {
        is_attached: bool,
        sticker_ids: Vec<i32>,
    },
    FavoriteStickers(UpdateFavoriteStickers) = "updateFavoriteStickers" {
        sticker_ids: Vec<i32>,
    },
    SavedAnimations(UpdateSavedAnimations) = "updateSavedAnimations" {
        animation_ids: Vec<i32>,
    },
    SavedNotificationSounds(UpdateSavedNotificationSounds) = "updateSavedNotificationSounds" {
        notification_sound_ids: Vec<TdInt64>,
    },
    DefaultBackground(UpdateDefaultBackground) = "updateDefaultBackground" {
        for_dark_theme: bool,
        background: Option<TdObject>,
    },
    ChatThemes(UpdateChatThemes) = "updateChatThemes" {
        chat_themes: Vec<TdObject>,
    },
    AccentColors(UpdateAccentColors) = "updateAccentColors" {
        colors: Vec<TdObject>,
        available_accent_color_ids: Vec<i32>,
    },
    ProfileAccentColors(UpdateProfileAccentColors) = "updateProfileAccentColors" {
        colors: Vec<TdObject>,
        available_accent_color_ids: Vec<i32>,
    },
    LanguagePackStrings(UpdateLanguagePackStrings) = "updateLanguagePackStrings" {
        localization_target: String,
        language_pack_id: String,
        strings: Vec<TdObject>,
    },
    ConnectionState(UpdateConnectionState) = "updateConnectionState" {
        state: TdObject,
    },
    FreezeState(UpdateFreezeState) = "updateFreezeState" {
        is_frozen: bool,
        freezing_date: i32,
        deletion_date: i32,
        appeal_link: String,
    },
    TermsOfService(UpdateTermsOfService) = "updateTermsOfService" {
        terms_of_service_id: String,
        terms_of_service: TdObject,
    },
    UnconfirmedSession(UpdateUnconfirmedSession) = "updateUnconfirmedSession" {
        session: Option<TdObject>,
    },
    AttachmentMenuBots(UpdateAttachmentMenuBots) = "updateAttachmentMenuBots" {
        bots: Vec<TdObject>,
    },
    WebAppMessageSent(UpdateWebAppMessageSent) = "updateWebAppMessageSent" {
        web_app_launch_id: TdInt64,
    },
    ActiveEmojiReactions(UpdateActiveEmojiReactions) = "updateActiveEmojiReactions" {
        emojis: Vec<String>,
    },
    AvailableMessageEffects(UpdateAvailableMessageEffects) = "updateAvailableMessageEffects" {
        reaction_effect_ids: Vec<TdInt64>,
        sticker_effect_ids: Vec<TdInt64>,
    },
    DefaultReactionType(UpdateDefaultReactionType) = "updateDefaultReactionType" {
        reaction_type: TdObject,
    },
    DefaultPaidReactionType(UpdateDefaultPaidReactionType) = "updateDefaultPaidReactionType" {
        #[wire = "type"] kind: TdObject,
    },
    SavedMessagesTags(UpdateSavedMessagesTags) = "updateSavedMessagesTags" {
        saved_messages_topic_id: i64,
        tags: TdObject,
    },
    ActiveLiveLocationMessages(UpdateActiveLiveLocationMessages) = "updateActiveLiveLocationMessages" {
        messages: Vec<TdObject>,
    },
    OwnedStarCount(UpdateOwnedStarCount) = "updateOwnedStarCount" {
        star_amount: TdObject,
    },
    ChatRevenueAmount(UpdateChatRevenueAmount) = "updateChatRevenueAmount" {
        chat_id: i64,
        revenue_amount: TdObject,
    },
    StarRevenueStatus(UpdateStarRevenueStatus) = "updateStarRevenueStatus" {
        owner_id: TdObject,
        status: TdObject,
    },
    SpeechRecognitionTrial(UpdateSpeechRecognitionTrial) = "updateSpeechRecognitionTrial" {
        max_media_duration: i32,
        weekly_count: i32,
        left_count: i32,
        next_reset_date: i32,
    },
    DiceEmojis(UpdateDiceEmojis) = "updateDiceEmojis" {
        emojis: Vec<String>,
    },
    AnimatedEmojiMessageClicked(UpdateAnimatedEmojiMessageClicked) = "updateAnimatedEmojiMessageClicked" {
        chat_id: i64,
        message_id: i64,
        sticker: TdObject,
    },
    AnimationSearchParameters(UpdateAnimationSearchParameters) = "updateAnimationSearchParameters" {
        provider: String,
        emojis: Vec<String>,
    },
    SuggestedActions(UpdateSuggestedActions) = "updateSuggestedActions" {
        added_actions: Vec<TdObject>,
        removed_actions: Vec<TdObject>,
    },
    SpeedLimitNotification(UpdateSpeedLimitNotification) = "updateSpeedLimitNotification" {
        is_upload: bool,
    },
    ContactCloseBirthdays(UpdateContactCloseBirthdays) = "updateContactCloseBirthdays" {
        close_birthday_users: Vec<TdObject>,
    },
    AutosaveSettings(UpdateAutosaveSettings) = "updateAutosaveSettings" {
        scope: TdObject,
        settings: Option<TdObject>,
    },

    // Business and bots
    BusinessConnection(UpdateBusinessConnection) = "updateBusinessConnection" {
        connection: TdObject,
    },
    NewBusinessMessage(UpdateNewBusinessMessage) = "updateNewBusinessMessage" {
        connection_id: String,
        message: TdObject,
    },
    BusinessMessageEdited(UpdateBusinessMessageEdited) = "updateBusinessMessageEdited" {
        connection_id: String,
        message: TdObject,
    },
    BusinessMessagesDeleted(UpdateBusinessMessagesDeleted) = "updateBusinessMessagesDeleted" {
        connection_id: String,
        chat_id: i64,
        message_ids: Vec<i64>,
    },
    NewInlineQuery(UpdateNewInlineQuery) = "updateNewInlineQuery" {
        id: TdInt64,
        sender_user_id: i64,
        user_location: Option<TdObject>,
        chat_type: Option<TdObject>,
        query: String,
        offset: String,
    },
    NewChosenInlineResult(UpdateNewChosenInlineResult) = "updateNewChosenInlineResult" {
        sender_user_id: i64,
        user_location: Option<TdObject>,
        query: String,
        result_id: String,
        inline_message_id: String,
    },
    NewCallbackQuery(UpdateNewCallbackQuery) = "updateNewCallbackQuery" {
        id: TdInt64,
        sender_user_id: i64,
        chat_id: i64,
        message_id: i64,
        chat_instance: TdInt64,
        payload: TdObject,
    },
    NewInlineCallbackQuery(UpdateNewInlineCallbackQuery) = "updateNewInlineCallbackQuery" {
        id: TdInt64,
        sender_user_id: i64,
        inline_message_id: String,
        chat_instance: TdInt64,
        payload: TdObject,
    },
    NewBusinessCallbackQuery(UpdateNewBusinessCallbackQuery) = "updateNewBusinessCallbackQuery" {
        id: TdInt64,
        sender_user_id: i64,
        connection_id: String,
        message: TdObject,
        chat_instance: TdInt64,
        payload: TdObject,
    },
    NewShippingQuery(UpdateNewShippingQuery) = "updateNewShippingQuery" {
        id: TdInt64,
        sender_user_id: i64,
        invoice_payload: String,
        shipping_address: TdObject,
    },
    NewPreCheckoutQuery(UpdateNewPreCheckoutQuery) = "updateNewPreCheckoutQuery" {
        id: TdInt64,
        sender_user_id: i64,
        currency: String,
        total_amount: i64,
        invoice_payload: String,
        shipping_option_id: String,
        order_info: Option<TdObject>,
    },
    NewCustomEvent(UpdateNewCustomEvent) = "updateNewCustomEvent" {
        event: String,
    },
    NewCustomQuery(UpdateNewCustomQuery) = "updateNewCustomQuery" {
        id: TdInt64,
        data: String,
        timeout: i32,
    },
    Poll(UpdatePoll) = "updatePoll" {
        poll: TdObject,
    },
    PollAnswer(UpdatePollAnswer) = "updatePollAnswer" {
        poll_id: TdInt64,
        voter_id: TdObject,
        option_ids: Vec<i32>,
    },
    ChatMember(UpdateChatMember) = "updateChatMember" {
        chat_id: i64,
        actor_user_id: i64,
        date: i32,
        invite_link: Option<TdObject>,
        via_join_request: bool,
        via_chat_folder_invite_link: bool,
        old_chat_member: TdObject,
        new_chat_member: TdObject,
    },
    NewChatJoinRequest(UpdateNewChatJoinRequest) = "updateNewChatJoinRequest" {
        chat_id: i64,
        request: TdObject,
        user_chat_id: i64,
        invite_link: Option<TdObject>,
    },
    ChatBoost(UpdateChatBoost) = "updateChatBoost" {
        chat_id: i64,
        boost: TdObject,
    },
    MessageReaction(UpdateMessageReaction) = "updateMessageReaction" {
        chat_id: i64,
        message_id: i64,
        actor_id: TdObject,
        date: i32,
        old_reaction_types: Vec<TdObject>,
        new_reaction_types: Vec<TdObject>,
    },
    MessageReactions(UpdateMessageReactions) = "updateMessageReactions" {
        chat_id: i64,
        message_id: i64,
        date: i32,
        reactions: Vec<TdObject>,
    },
    PaidMediaPurchased(UpdatePaidMediaPurchased) = "updatePaidMediaPurchased" {
        user_id: i64,
        payload: String,
    },
}
