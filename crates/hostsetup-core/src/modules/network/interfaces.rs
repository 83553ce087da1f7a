use once_cell::sync::Lazy;
use regex::Regex;
use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use thiserror::Error;

const END_LINE: &str = "\r\n";
const GENERATOR_COMMENT: &str = "# generated by hostsetup";

// First capture group is everything after the `auto` keyword.
static AUTO_LINE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^auto(.+)$").unwrap());

#[derive(Debug, Error)]
pub enum InterfacesError {
  #[error("parse error: missing `auto` definition")]
  MissingAuto,
  #[error("parse error: incorrect iface definition at: '{0}'")]
  BadIfaceDefinition(String),
  #[error("parse error: unexpected setting '{key}' for iface '{device}' without a settings mode")]
  UnexpectedSetting { device: String, key: String },
  #[error("invalid configuration: missing ifaces")]
  MissingIfaces,
  #[error("invalid configuration: iface property '{0}' is required")]
  MissingProperty(&'static str),
  #[error("invalid configuration: undefined value for iface property '{0}'")]
  UndefinedValue(String),
  #[error(transparent)]
  Io(#[from] std::io::Error),
}

/// Address configuration mode of an `iface` stanza.
///
/// Only `static` and `dhcp` stanzas carry setting lines; any unrecognized
/// mode string is kept verbatim in `Other`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Mode {
  Static,
  Dhcp,
  Loopback,
  Manual,
  Other(String),
}

impl Mode {
  pub fn as_str(&self) -> &str {
    match self {
      Mode::Static => "static",
      Mode::Dhcp => "dhcp",
      Mode::Loopback => "loopback",
      Mode::Manual => "manual",
      Mode::Other(s) => s,
    }
  }

  /// Whether stanzas of this mode carry setting lines.
  pub fn has_settings(&self) -> bool {
    matches!(self, Mode::Static | Mode::Dhcp)
  }
}

impl From<&str> for Mode {
  fn from(s: &str) -> Self {
    match s {
      "static" => Mode::Static,
      "dhcp" => Mode::Dhcp,
      "loopback" => Mode::Loopback,
      "manual" => Mode::Manual,
      _ => Mode::Other(String::from(s)),
    }
  }
}

impl From<String> for Mode {
  fn from(s: String) -> Self {
    Mode::from(s.as_str())
  }
}

impl From<Mode> for String {
  fn from(mode: Mode) -> Self {
    String::from(mode.as_str())
  }
}

impl fmt::Display for Mode {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

/// A directive value: one word, or the ordered words of a multi-word
/// directive such as `dns-search`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SettingValue {
  Single(String),
  List(Vec<String>),
}

impl SettingValue {
  fn from_tokens(mut tokens: Vec<String>) -> Self {
    if tokens.len() == 1 {
      SettingValue::Single(tokens.remove(0))
    } else {
      SettingValue::List(tokens)
    }
  }

  /// Empty values never serialize into a valid directive line.
  fn is_undefined(&self) -> bool {
    match self {
      SettingValue::Single(s) => s.is_empty(),
      SettingValue::List(values) => values.is_empty() || values.iter().any(|v| v.is_empty()),
    }
  }

  fn render(&self) -> String {
    match self {
      SettingValue::Single(s) => s.clone(),
      SettingValue::List(values) => values.join(" "),
    }
  }
}

impl From<&str> for SettingValue {
  fn from(s: &str) -> Self {
    SettingValue::Single(String::from(s))
  }
}

impl From<Vec<&str>> for SettingValue {
  fn from(values: Vec<&str>) -> Self {
    SettingValue::List(values.into_iter().map(String::from).collect())
  }
}

/// Ordered directive map of a `static` or `dhcp` stanza.
///
/// Keys keep first-insertion order; assigning an existing key replaces the
/// value in place. Keys are case- and spelling-sensitive, no synonym
/// normalization.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Settings(Vec<(String, SettingValue)>);

impl Settings {
  pub fn new() -> Self {
    Settings(Vec::new())
  }

  pub fn insert(&mut self, key: impl Into<String>, value: impl Into<SettingValue>) {
    let key = key.into();
    let value = value.into();
    match self.0.iter_mut().find(|(k, _)| *k == key) {
      Some(slot) => slot.1 = value,
      None => self.0.push((key, value)),
    }
  }

  pub fn get(&self, key: &str) -> Option<&SettingValue> {
    self.0.iter().find(|(k, _)| k == key).map(|(_, v)| v)
  }

  pub fn iter(&self) -> impl Iterator<Item = (&str, &SettingValue)> {
    self.0.iter().map(|(k, v)| (k.as_str(), v))
  }

  pub fn len(&self) -> usize {
    self.0.len()
  }

  pub fn is_empty(&self) -> bool {
    self.0.is_empty()
  }
}

impl<K: Into<String>, V: Into<SettingValue>> FromIterator<(K, V)> for Settings {
  fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
    let mut settings = Settings::new();
    for (key, value) in iter {
      settings.insert(key, value);
    }
    settings
  }
}

// serde_json's own map type reorders keys; going through a map visitor keeps
// the document order of the profile file.
impl Serialize for Settings {
  fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
    let mut map = serializer.serialize_map(Some(self.0.len()))?;
    for (key, value) in &self.0 {
      map.serialize_entry(key, value)?;
    }
    map.end()
  }
}

impl<'de> Deserialize<'de> for Settings {
  fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
    struct SettingsVisitor;

    impl<'de> Visitor<'de> for SettingsVisitor {
      type Value = Settings;

      fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a map of iface settings")
      }

      fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Settings, A::Error> {
        let mut settings = Settings::new();
        while let Some((key, value)) = access.next_entry::<String, SettingValue>()? {
          settings.insert(key, value);
        }
        Ok(settings)
      }
    }

    deserializer.deserialize_map(SettingsVisitor)
  }
}

/// One `iface` stanza.
///
/// `autostart`, the classification flags and `raw` are derived on decode;
/// a caller building a document for encode only needs `device`, `mode` and
/// optionally `settings`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Interface {
  pub device: String,
  pub mode: Mode,
  #[serde(default)]
  pub autostart: bool,
  #[serde(default)]
  pub wired: bool,
  #[serde(default)]
  pub bluetooth: bool,
  #[serde(default)]
  pub loopback: bool,
  #[serde(default)]
  pub wireless: bool,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub settings: Option<Settings>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub raw: Option<String>,
}

impl Interface {
  pub fn new(device: impl Into<String>, mode: Mode) -> Self {
    let settings = mode.has_settings().then(Settings::new);
    let mut iface = Interface {
      device: device.into(),
      mode,
      autostart: false,
      wired: false,
      bluetooth: false,
      loopback: false,
      wireless: false,
      settings,
      raw: None,
    };
    iface.classify();
    iface
  }

  pub fn with_setting(mut self, key: impl Into<String>, value: impl Into<SettingValue>) -> Self {
    self.settings.get_or_insert_with(Settings::new).insert(key, value);
    self
  }

  // Substring matches on the device name. Presentation hints only; several
  // flags (or none) may hold for one device.
  fn classify(&mut self) {
    self.wired = self.device.contains("eth");
    self.bluetooth = self.device.contains("bnep");
    self.loopback = self.device.contains("lo");
    self.wireless = self.device.contains("wlan");
  }
}

/// Structured form of an `/etc/network/interfaces` file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InterfacesDocument {
  /// Devices named on the `auto` line, in order, duplicates preserved.
  #[serde(default, deserialize_with = "one_or_many")]
  pub auto: Vec<String>,
  /// One entry per `iface` stanza, in file order.
  #[serde(default, alias = "ifaces", deserialize_with = "one_or_many")]
  pub interfaces: Vec<Interface>,
}

impl InterfacesDocument {
  pub fn new(auto: Vec<String>, interfaces: Vec<Interface>) -> Self {
    InterfacesDocument { auto, interfaces }
  }
}

// Profiles may give `auto` or `interfaces` as a single value instead of an
// array; both shapes land in the same Vec before anything else runs.
fn one_or_many<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
  D: Deserializer<'de>,
  T: Deserialize<'de>,
{
  #[derive(Deserialize)]
  #[serde(untagged)]
  enum OneOrMany<T> {
    Many(Vec<T>),
    One(T),
  }

  Ok(match OneOrMany::deserialize(deserializer)? {
    OneOrMany::Many(values) => values,
    OneOrMany::One(value) => vec![value],
  })
}

/// Strip tabs, split into lines, drop blanks, trim. Tolerates LF and CRLF.
fn normalize(text: &str) -> Vec<String> {
  text
    .split('\n')
    .map(|line| line.replace('\t', "").trim().to_string())
    .filter(|line| !line.is_empty())
    .collect()
}

enum ScanState {
  SeekingStanza,
  InStanza,
}

/// Parse interfaces-file text into a structured document.
///
/// The scanner has two states: outside a stanza everything but an `iface`
/// line is skipped; inside one, a comment line closes the stanza, another
/// `iface` line starts the next, and anything else is a setting line.
pub fn decode(text: &str) -> Result<InterfacesDocument, InterfacesError> {
  let lines = normalize(text);

  // The first `auto` line defines the autostart list; later ones are
  // settings of whatever stanza they appear in.
  let auto: Vec<String> = lines
    .iter()
    .find_map(|line| AUTO_LINE.captures(line))
    .map(|captures| {
      captures[1]
        .split_whitespace()
        .map(String::from)
        .collect()
    })
    .ok_or(InterfacesError::MissingAuto)?;

  let mut stanzas: Vec<Vec<&str>> = Vec::new();
  let mut state = ScanState::SeekingStanza;
  for line in &lines {
    let line = line.as_str();
    let is_iface = line.split_whitespace().next() == Some("iface");
    match state {
      ScanState::SeekingStanza => {
        if is_iface {
          stanzas.push(vec![line]);
          state = ScanState::InStanza;
        }
      }
      ScanState::InStanza => {
        if is_iface {
          stanzas.push(vec![line]);
        } else if line.starts_with('#') {
          state = ScanState::SeekingStanza;
        } else if let Some(stanza) = stanzas.last_mut() {
          stanza.push(line);
        }
      }
    }
  }

  let interfaces = stanzas
    .iter()
    .map(|stanza| parse_stanza(stanza, &auto))
    .collect::<Result<Vec<_>, _>>()?;

  log::trace!(
    "Decoded {} auto device(s), {} iface stanza(s)",
    auto.len(),
    interfaces.len()
  );
  Ok(InterfacesDocument { auto, interfaces })
}

fn parse_stanza(lines: &[&str], auto: &[String]) -> Result<Interface, InterfacesError> {
  // iface <device> <family> <mode>
  let definition: Vec<&str> = lines[0].split_whitespace().collect();
  if definition.len() < 4 {
    return Err(InterfacesError::BadIfaceDefinition(String::from(lines[0])));
  }

  let mut iface = Interface::new(definition[1], Mode::from(definition[3]));
  iface.autostart = auto.iter().any(|device| device == &iface.device);

  for line in &lines[1..] {
    let mut tokens = line.split_whitespace();
    let Some(key) = tokens.next() else {
      continue;
    };
    let value = SettingValue::from_tokens(tokens.map(String::from).collect());
    match iface.settings.as_mut() {
      Some(settings) => settings.insert(key, value),
      None => {
        return Err(InterfacesError::UnexpectedSetting {
          device: iface.device,
          key: String::from(key),
        });
      }
    }
  }

  let mut raw = lines.join(END_LINE);
  raw.push_str(END_LINE);
  iface.raw = Some(raw);
  Ok(iface)
}

/// Serialize a document into interfaces-file text.
///
/// Pure: the whole document is validated before a single output line is
/// assembled, so a failure can never leave a partial file behind. The
/// caller persists the returned string.
pub fn encode(doc: &InterfacesDocument) -> Result<String, InterfacesError> {
  if doc.interfaces.is_empty() {
    return Err(InterfacesError::MissingIfaces);
  }

  for iface in &doc.interfaces {
    if iface.device.is_empty() {
      return Err(InterfacesError::MissingProperty("device"));
    }
    if iface.mode.as_str().is_empty() {
      return Err(InterfacesError::MissingProperty("mode"));
    }
    if !iface.mode.has_settings() {
      continue;
    }
    if let Some(settings) = &iface.settings {
      for (key, value) in settings.iter() {
        if value.is_undefined() {
          return Err(InterfacesError::UndefinedValue(String::from(key)));
        }
      }
    }
  }

  let auto: Vec<&str> = if doc.auto.is_empty() {
    vec!["lo"]
  } else {
    doc.auto.iter().map(String::as_str).collect()
  };

  let mut lines = vec![
    String::from(GENERATOR_COMMENT),
    format!("auto {}", auto.join(" ")),
  ];
  for iface in &doc.interfaces {
    lines.push(String::new());
    lines.push(format!("iface {} inet {}", iface.device, iface.mode));
    if !iface.mode.has_settings() {
      continue;
    }
    let Some(settings) = &iface.settings else {
      continue;
    };
    for (key, value) in settings.iter() {
      lines.push(format!("\t{key} {}", value.render()));
    }
  }

  let mut output = lines.join(END_LINE);
  output.push_str(END_LINE);
  Ok(output)
}
