// crates/gtm-core/src/constants.rs
// ============================================================================
// Module: GTM Constant Registry
// Description: Closed enums, open type codes, limits, and membership sets.
// Purpose: Provide wire-stable codes shared by validators and builders.
// Dependencies: serde
// ============================================================================

//! ## Overview
//! Trigger types, filter operators, and parameter kinds are closed sets and
//! are modelled as enums. Tag and variable types are open: GTM accepts custom
//! template codes, so they are validated-string newtypes with the known codes
//! published as constants. Every string here is part of the GTM API v2 wire
//! format; changing one is a breaking change.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;

use serde::Deserialize;
use serde::Serialize;

use crate::errors::ValidationError;
use crate::validation::validate_tag_type;
use crate::validation::validate_variable_type;

// ============================================================================
// SECTION: Limits
// ============================================================================

/// Maximum GA4 event name length.
pub const GA4_EVENT_NAME_MAX_LENGTH: usize = 40;
/// Maximum GA4 event parameter name length.
pub const GA4_PARAMETER_NAME_MAX_LENGTH: usize = 40;
/// Maximum GA4 event parameter value length.
pub const GA4_PARAMETER_VALUE_MAX_LENGTH: usize = 100;
/// Maximum GTM entity name length.
pub const GTM_NAME_MAX_LENGTH: usize = 256;
/// Maximum GTM notes length.
pub const GTM_NOTES_MAX_LENGTH: usize = 5000;
/// Minimum number of digits in a GTM account identifier.
pub const ACCOUNT_ID_MIN_DIGITS: usize = 10;
/// Workspace identifier GTM assigns to the default workspace.
pub const DEFAULT_WORKSPACE_ID: &str = "1";
/// Built-in variable reference for the current data layer event.
pub const EVENT_VARIABLE_REFERENCE: &str = "{{_event}}";

// ============================================================================
// SECTION: Trigger Types
// ============================================================================

/// Closed set of GTM trigger types.
///
/// [`TriggerType::as_str`] yields the registry code (`CUSTOM_EVENT`), and
/// [`TriggerType::api_name`] yields the GTM REST spelling (`customEvent`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TriggerType {
    /// Page view.
    Pageview,
    /// DOM ready.
    DomReady,
    /// Window loaded.
    WindowLoaded,
    /// Custom data layer event.
    CustomEvent,
    /// Trigger group.
    TriggerGroup,
    /// Form submission.
    FormSubmission,
    /// All element click.
    Click,
    /// Link click.
    LinkClick,
    /// JavaScript error.
    JsError,
    /// History change.
    HistoryChange,
    /// Timer.
    Timer,
    /// Scroll depth.
    ScrollDepth,
    /// Element visibility.
    ElementVisibility,
    /// YouTube video.
    YoutubeVideo,
    /// Server container page view.
    ServerPageview,
    /// Server container always.
    Always,
    /// Consent initialization.
    ConsentInit,
    /// Initialization.
    Init,
    /// Firebase app exception.
    FirebaseAppException,
    /// Firebase app update.
    FirebaseAppUpdate,
    /// Firebase campaign.
    FirebaseCampaign,
    /// Firebase first open.
    FirebaseFirstOpen,
    /// Firebase in-app purchase.
    FirebaseInAppPurchase,
    /// Firebase notification dismiss.
    FirebaseNotificationDismiss,
    /// Firebase notification foreground.
    FirebaseNotificationForeground,
    /// Firebase notification open.
    FirebaseNotificationOpen,
    /// Firebase notification receive.
    FirebaseNotificationReceive,
    /// Firebase OS update.
    FirebaseOsUpdate,
    /// Firebase session start.
    FirebaseSessionStart,
    /// Firebase user engagement.
    FirebaseUserEngagement,
    /// AMP click.
    AmpClick,
    /// AMP timer.
    AmpTimer,
    /// AMP scroll.
    AmpScroll,
    /// AMP visibility.
    AmpVisibility,
}

impl TriggerType {
    /// Returns the registry code for this trigger type.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pageview => "PAGEVIEW",
            Self::DomReady => "DOM_READY",
            Self::WindowLoaded => "WINDOW_LOADED",
            Self::CustomEvent => "CUSTOM_EVENT",
            Self::TriggerGroup => "TRIGGER_GROUP",
            Self::FormSubmission => "FORM_SUBMISSION",
            Self::Click => "CLICK",
            Self::LinkClick => "LINK_CLICK",
            Self::JsError => "JS_ERROR",
            Self::HistoryChange => "HISTORY_CHANGE",
            Self::Timer => "TIMER",
            Self::ScrollDepth => "SCROLL_DEPTH",
            Self::ElementVisibility => "ELEMENT_VISIBILITY",
            Self::YoutubeVideo => "YOUTUBE_VIDEO",
            Self::ServerPageview => "SERVER_PAGEVIEW",
            Self::Always => "ALWAYS",
            Self::ConsentInit => "CONSENT_INIT",
            Self::Init => "INIT",
            Self::FirebaseAppException => "FIREBASE_APP_EXCEPTION",
            Self::FirebaseAppUpdate => "FIREBASE_APP_UPDATE",
            Self::FirebaseCampaign => "FIREBASE_CAMPAIGN",
            Self::FirebaseFirstOpen => "FIREBASE_FIRST_OPEN",
            Self::FirebaseInAppPurchase => "FIREBASE_IN_APP_PURCHASE",
            Self::FirebaseNotificationDismiss => "FIREBASE_NOTIFICATION_DISMISS",
            Self::FirebaseNotificationForeground => "FIREBASE_NOTIFICATION_FOREGROUND",
            Self::FirebaseNotificationOpen => "FIREBASE_NOTIFICATION_OPEN",
            Self::FirebaseNotificationReceive => "FIREBASE_NOTIFICATION_RECEIVE",
            Self::FirebaseOsUpdate => "FIREBASE_OS_UPDATE",
            Self::FirebaseSessionStart => "FIREBASE_SESSION_START",
            Self::FirebaseUserEngagement => "FIREBASE_USER_ENGAGEMENT",
            Self::AmpClick => "AMP_CLICK",
            Self::AmpTimer => "AMP_TIMER",
            Self::AmpScroll => "AMP_SCROLL",
            Self::AmpVisibility => "AMP_VISIBILITY",
        }
    }

    /// Returns the GTM REST API spelling for this trigger type.
    #[must_use]
    pub const fn api_name(self) -> &'static str {
        match self {
            Self::Pageview => "pageview",
            Self::DomReady => "domReady",
            Self::WindowLoaded => "windowLoaded",
            Self::CustomEvent => "customEvent",
            Self::TriggerGroup => "triggerGroup",
            Self::FormSubmission => "formSubmission",
            Self::Click => "click",
            Self::LinkClick => "linkClick",
            Self::JsError => "jsError",
            Self::HistoryChange => "historyChange",
            Self::Timer => "timer",
            Self::ScrollDepth => "scrollDepth",
            Self::ElementVisibility => "elementVisibility",
            Self::YoutubeVideo => "youTubeVideo",
            Self::ServerPageview => "serverPageview",
            Self::Always => "always",
            Self::ConsentInit => "consentInit",
            Self::Init => "init",
            Self::FirebaseAppException => "firebaseAppException",
            Self::FirebaseAppUpdate => "firebaseAppUpdate",
            Self::FirebaseCampaign => "firebaseCampaign",
            Self::FirebaseFirstOpen => "firebaseFirstOpen",
            Self::FirebaseInAppPurchase => "firebaseInAppPurchase",
            Self::FirebaseNotificationDismiss => "firebaseNotificationDismiss",
            Self::FirebaseNotificationForeground => "firebaseNotificationForeground",
            Self::FirebaseNotificationOpen => "firebaseNotificationOpen",
            Self::FirebaseNotificationReceive => "firebaseNotificationReceive",
            Self::FirebaseOsUpdate => "firebaseOsUpdate",
            Self::FirebaseSessionStart => "firebaseSessionStart",
            Self::FirebaseUserEngagement => "firebaseUserEngagement",
            Self::AmpClick => "ampClick",
            Self::AmpTimer => "ampTimer",
            Self::AmpScroll => "ampScroll",
            Self::AmpVisibility => "ampVisibility",
        }
    }

    /// Returns every trigger type in registry order.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[
            Self::Pageview,
            Self::DomReady,
            Self::WindowLoaded,
            Self::CustomEvent,
            Self::TriggerGroup,
            Self::FormSubmission,
            Self::Click,
            Self::LinkClick,
            Self::JsError,
            Self::HistoryChange,
            Self::Timer,
            Self::ScrollDepth,
            Self::ElementVisibility,
            Self::YoutubeVideo,
            Self::ServerPageview,
            Self::Always,
            Self::ConsentInit,
            Self::Init,
            Self::FirebaseAppException,
            Self::FirebaseAppUpdate,
            Self::FirebaseCampaign,
            Self::FirebaseFirstOpen,
            Self::FirebaseInAppPurchase,
            Self::FirebaseNotificationDismiss,
            Self::FirebaseNotificationForeground,
            Self::FirebaseNotificationOpen,
            Self::FirebaseNotificationReceive,
            Self::FirebaseOsUpdate,
            Self::FirebaseSessionStart,
            Self::FirebaseUserEngagement,
            Self::AmpClick,
            Self::AmpTimer,
            Self::AmpScroll,
            Self::AmpVisibility,
        ]
    }

    /// Parses an exact, case-sensitive registry code.
    #[must_use]
    pub fn parse(code: &str) -> Option<Self> {
        Self::all().iter().copied().find(|kind| kind.as_str() == code)
    }

    /// Parses either a registry code or a GTM REST spelling.
    #[must_use]
    pub fn parse_lenient(value: &str) -> Option<Self> {
        Self::all().iter().copied().find(|kind| kind.as_str() == value || kind.api_name() == value)
    }
}

impl fmt::Display for TriggerType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// SECTION: Filter Types
// ============================================================================

/// Closed set of GTM filter operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FilterType {
    /// Exact equality.
    Equals,
    /// Substring match.
    Contains,
    /// Prefix match.
    StartsWith,
    /// Suffix match.
    EndsWith,
    /// Regular expression match.
    MatchesRegex,
    /// Numeric greater-than.
    GreaterThan,
    /// Numeric greater-or-equal.
    GreaterOrEquals,
    /// Numeric less-than.
    LessThan,
    /// Numeric less-or-equal.
    LessOrEquals,
    /// CSS selector match.
    CssSelector,
    /// Regular expression match (alternate code).
    MatchRegex,
}

impl FilterType {
    /// Returns the registry code for this operator.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Equals => "EQUALS",
            Self::Contains => "CONTAINS",
            Self::StartsWith => "STARTS_WITH",
            Self::EndsWith => "ENDS_WITH",
            Self::MatchesRegex => "MATCHES_REGEX",
            Self::GreaterThan => "GREATER_THAN",
            Self::GreaterOrEquals => "GREATER_OR_EQUALS",
            Self::LessThan => "LESS_THAN",
            Self::LessOrEquals => "LESS_OR_EQUALS",
            Self::CssSelector => "CSS_SELECTOR",
            Self::MatchRegex => "MATCH_REGEX",
        }
    }

    /// Returns every operator in registry order.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[
            Self::Equals,
            Self::Contains,
            Self::StartsWith,
            Self::EndsWith,
            Self::MatchesRegex,
            Self::GreaterThan,
            Self::GreaterOrEquals,
            Self::LessThan,
            Self::LessOrEquals,
            Self::CssSelector,
            Self::MatchRegex,
        ]
    }

    /// Parses an exact, case-sensitive registry code.
    #[must_use]
    pub fn parse(code: &str) -> Option<Self> {
        Self::all().iter().copied().find(|kind| kind.as_str() == code)
    }
}

impl fmt::Display for FilterType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// SECTION: Parameter Types
// ============================================================================

/// Closed set of GTM parameter kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ParameterType {
    /// String template value.
    Template,
    /// Boolean stored as `"true"` or `"false"`.
    Boolean,
    /// Integer stored in decimal form.
    Integer,
    /// Ordered list of parameters.
    List,
    /// Map of keyed parameters.
    Map,
    /// Reference to a tag by name.
    TagReference,
    /// Reference to a trigger by id.
    TriggerReference,
}

impl ParameterType {
    /// Returns the registry code for this parameter kind.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Template => "TEMPLATE",
            Self::Boolean => "BOOLEAN",
            Self::Integer => "INTEGER",
            Self::List => "LIST",
            Self::Map => "MAP",
            Self::TagReference => "TAG_REFERENCE",
            Self::TriggerReference => "TRIGGER_REFERENCE",
        }
    }

    /// Returns true when parameters of this kind carry a scalar `value`.
    #[must_use]
    pub const fn is_scalar(self) -> bool {
        !matches!(self, Self::List | Self::Map)
    }
}

impl fmt::Display for ParameterType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// SECTION: Tag Types
// ============================================================================

/// GA4 configuration tag.
pub const TAG_TYPE_GA4_CONFIG: &str = "gaawc";
/// GA4 event tag.
pub const TAG_TYPE_GA4_EVENT: &str = "gaawe";
/// Universal Analytics tag.
pub const TAG_TYPE_UA: &str = "ua";
/// Google Ads conversion tracking tag.
pub const TAG_TYPE_GOOGLE_ADS_CONVERSION: &str = "awct";
/// Google Ads remarketing tag.
pub const TAG_TYPE_GOOGLE_ADS_REMARKETING: &str = "sp";
/// Custom HTML tag.
pub const TAG_TYPE_CUSTOM_HTML: &str = "html";
/// Custom image tag.
pub const TAG_TYPE_CUSTOM_IMAGE: &str = "img";
/// Floodlight counter tag.
pub const TAG_TYPE_FLOODLIGHT_COUNTER: &str = "flc";
/// Floodlight sales tag.
pub const TAG_TYPE_FLOODLIGHT_SALES: &str = "fls";
/// Facebook pixel tag.
pub const TAG_TYPE_FACEBOOK_PIXEL: &str = "baut";
/// LinkedIn insight tag.
pub const TAG_TYPE_LINKEDIN_INSIGHT: &str = "linkedin";
/// Twitter conversion tag.
pub const TAG_TYPE_TWITTER_CONVERSION: &str = "twitter_website_tag";

/// Tag type codes known to this crate.
pub const KNOWN_TAG_TYPES: &[&str] = &[
    TAG_TYPE_GA4_CONFIG,
    TAG_TYPE_GA4_EVENT,
    TAG_TYPE_UA,
    TAG_TYPE_GOOGLE_ADS_CONVERSION,
    TAG_TYPE_GOOGLE_ADS_REMARKETING,
    TAG_TYPE_CUSTOM_HTML,
    TAG_TYPE_CUSTOM_IMAGE,
    TAG_TYPE_FLOODLIGHT_COUNTER,
    TAG_TYPE_FLOODLIGHT_SALES,
    TAG_TYPE_FACEBOOK_PIXEL,
    TAG_TYPE_LINKEDIN_INSIGHT,
    TAG_TYPE_TWITTER_CONVERSION,
];

/// Validated tag type code. Unknown codes pass through for custom templates.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct TagType(String);

impl TagType {
    /// Creates a tag type after lenient validation.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError`] when the code is empty.
    pub fn new(code: impl Into<String>) -> Result<Self, ValidationError> {
        let code = code.into();
        validate_tag_type(&code)?;
        Ok(Self(code))
    }

    /// Wraps one of the known tag type constants.
    pub(crate) fn known(code: &'static str) -> Self {
        Self(code.to_string())
    }

    /// Returns the tag type code.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns true when the code is one of [`KNOWN_TAG_TYPES`].
    #[must_use]
    pub fn is_known(&self) -> bool {
        KNOWN_TAG_TYPES.contains(&self.0.as_str())
    }
}

impl fmt::Display for TagType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// ============================================================================
// SECTION: Variable Types
// ============================================================================

/// Constant variable.
pub const VARIABLE_TYPE_CONSTANT: &str = "c";
/// Custom JavaScript variable.
pub const VARIABLE_TYPE_CUSTOM_JAVASCRIPT: &str = "jsm";
/// Data layer variable.
pub const VARIABLE_TYPE_DATA_LAYER: &str = "v";
/// URL variable.
pub const VARIABLE_TYPE_URL: &str = "u";
/// First-party cookie variable.
pub const VARIABLE_TYPE_FIRST_PARTY_COOKIE: &str = "k";
/// Lookup table variable.
pub const VARIABLE_TYPE_LOOKUP_TABLE: &str = "smm";
/// Regex table variable.
pub const VARIABLE_TYPE_REGEX_TABLE: &str = "remm";
/// Random number variable.
pub const VARIABLE_TYPE_RANDOM_NUMBER: &str = "r";
/// JavaScript global variable.
pub const VARIABLE_TYPE_JAVASCRIPT: &str = "j";
/// GA4 event settings variable.
pub const VARIABLE_TYPE_GA4_EVENT_SETTINGS: &str = "gtes";
/// GA4 configuration settings variable.
pub const VARIABLE_TYPE_GA4_CONFIG_SETTINGS: &str = "gas";
/// User-provided data variable.
pub const VARIABLE_TYPE_USER_PROVIDED_DATA: &str = "awec";
/// Container version number variable.
pub const VARIABLE_TYPE_CONTAINER_VERSION: &str = "ctv";
/// Debug mode variable.
pub const VARIABLE_TYPE_DEBUG_MODE: &str = "dbg";
/// Environment name variable.
pub const VARIABLE_TYPE_ENVIRONMENT_NAME: &str = "env";

/// Variable type codes known to this crate.
pub const KNOWN_VARIABLE_TYPES: &[&str] = &[
    VARIABLE_TYPE_CONSTANT,
    VARIABLE_TYPE_CUSTOM_JAVASCRIPT,
    VARIABLE_TYPE_DATA_LAYER,
    VARIABLE_TYPE_URL,
    VARIABLE_TYPE_FIRST_PARTY_COOKIE,
    VARIABLE_TYPE_LOOKUP_TABLE,
    VARIABLE_TYPE_REGEX_TABLE,
    VARIABLE_TYPE_RANDOM_NUMBER,
    VARIABLE_TYPE_JAVASCRIPT,
    VARIABLE_TYPE_GA4_EVENT_SETTINGS,
    VARIABLE_TYPE_GA4_CONFIG_SETTINGS,
    VARIABLE_TYPE_USER_PROVIDED_DATA,
    VARIABLE_TYPE_CONTAINER_VERSION,
    VARIABLE_TYPE_DEBUG_MODE,
    VARIABLE_TYPE_ENVIRONMENT_NAME,
];

/// Validated variable type code. Unknown codes pass through for custom templates.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct VariableType(String);

impl VariableType {
    /// Creates a variable type after lenient validation.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError`] when the code is empty.
    pub fn new(code: impl Into<String>) -> Result<Self, ValidationError> {
        let code = code.into();
        validate_variable_type(&code)?;
        Ok(Self(code))
    }

    /// Returns the variable type code.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns true when the code is one of [`KNOWN_VARIABLE_TYPES`].
    #[must_use]
    pub fn is_known(&self) -> bool {
        KNOWN_VARIABLE_TYPES.contains(&self.0.as_str())
    }
}

impl fmt::Display for VariableType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// ============================================================================
// SECTION: Membership Sets
// ============================================================================

/// Built-in variable names GTM can enable in a workspace.
pub const BUILT_IN_VARIABLES: &[&str] = &[
    "PAGE_URL",
    "PAGE_HOSTNAME",
    "PAGE_PATH",
    "REFERRER",
    "EVENT",
    "CLICK_ELEMENT",
    "CLICK_CLASSES",
    "CLICK_ID",
    "CLICK_TARGET",
    "CLICK_URL",
    "CLICK_TEXT",
    "FORM_ELEMENT",
    "FORM_CLASSES",
    "FORM_ID",
    "FORM_TARGET",
    "FORM_URL",
    "FORM_TEXT",
    "ERROR_MESSAGE",
    "ERROR_URL",
    "ERROR_LINE",
    "NEW_HISTORY_FRAGMENT",
    "OLD_HISTORY_FRAGMENT",
    "NEW_HISTORY_STATE",
    "OLD_HISTORY_STATE",
    "HISTORY_SOURCE",
    "VIDEO_PROVIDER",
    "VIDEO_URL",
    "VIDEO_TITLE",
    "VIDEO_DURATION",
    "VIDEO_PERCENT",
    "VIDEO_VISIBLE",
    "VIDEO_STATUS",
    "VIDEO_CURRENT_TIME",
    "SCROLL_DEPTH_THRESHOLD",
    "SCROLL_DEPTH_UNITS",
    "SCROLL_DIRECTION",
    "ELEMENT_VISIBILITY_RATIO",
    "ELEMENT_VISIBILITY_TIME",
    "ELEMENT_VISIBILITY_FIRST_TIME",
    "ELEMENT_VISIBILITY_RECENT_TIME",
];

/// Default vertical scroll thresholds, ascending.
pub const DEFAULT_SCROLL_PERCENTAGES: [u8; 6] = [10, 25, 50, 75, 90, 100];

/// Tag firing options accepted by GTM.
pub const TAG_FIRING_OPTIONS: &[&str] = &["UNLIMITED", "ONCE_PER_EVENT", "ONCE_PER_LOAD"];

/// Scope for deleting containers.
pub const SCOPE_DELETE_CONTAINERS: &str =
    "https://www.googleapis.com/auth/tagmanager.delete.containers";
/// Scope for editing containers.
pub const SCOPE_EDIT_CONTAINERS: &str = "https://www.googleapis.com/auth/tagmanager.edit.containers";
/// Scope for editing container versions.
pub const SCOPE_EDIT_CONTAINER_VERSIONS: &str =
    "https://www.googleapis.com/auth/tagmanager.edit.containerversions";
/// Scope for managing accounts.
pub const SCOPE_MANAGE_ACCOUNTS: &str = "https://www.googleapis.com/auth/tagmanager.manage.accounts";
/// Scope for managing users.
pub const SCOPE_MANAGE_USERS: &str = "https://www.googleapis.com/auth/tagmanager.manage.users";
/// Scope for publishing versions.
pub const SCOPE_PUBLISH: &str = "https://www.googleapis.com/auth/tagmanager.publish";
/// Read-only scope.
pub const SCOPE_READONLY: &str = "https://www.googleapis.com/auth/tagmanager.readonly";

/// Every Tag Manager OAuth scope.
pub const SCOPES: &[&str] = &[
    SCOPE_DELETE_CONTAINERS,
    SCOPE_EDIT_CONTAINERS,
    SCOPE_EDIT_CONTAINER_VERSIONS,
    SCOPE_MANAGE_ACCOUNTS,
    SCOPE_MANAGE_USERS,
    SCOPE_PUBLISH,
    SCOPE_READONLY,
];

/// Minimum scopes for read-only tools.
pub const MINIMUM_READ_SCOPES: &[&str] = &[SCOPE_READONLY];
/// Minimum scopes for tools that create or edit entities.
pub const MINIMUM_WRITE_SCOPES: &[&str] = &[SCOPE_EDIT_CONTAINERS, SCOPE_EDIT_CONTAINER_VERSIONS];
/// Minimum scopes for publishing.
pub const MINIMUM_PUBLISH_SCOPES: &[&str] = &[SCOPE_PUBLISH];

// ============================================================================
// SECTION: Tests
// ============================================================================
