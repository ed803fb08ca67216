/// The kind of a task/span, mirroring OpenTelemetry's span kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Kind {
	Unknown,
	Client,
	Server,
	Producer,
	Consumer,
	Internal,
}

impl Default for Kind {
	fn default() -> Self {
		Kind::Unknown
	}
}

impl Kind {
	pub fn from_str_lossy(s: &str) -> Self {
		match s {
			"client" => Kind::Client,
			"server" => Kind::Server,
			"producer" => Kind::Producer,
			"consumer" => Kind::Consumer,
			"internal" => Kind::Internal,
			_ => Kind::Unknown,
		}
	}

	pub fn as_str(&self) -> &'static str {
		match self {
			Kind::Unknown => "unknown",
			Kind::Client => "client",
			Kind::Server => "server",
			Kind::Producer => "producer",
			Kind::Consumer => "consumer",
			Kind::Internal => "internal",
		}
	}
}
