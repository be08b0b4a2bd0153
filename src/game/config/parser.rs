#[derive(Debug, Clone, PartialEq)]
pub enum ConfigToken {
    String(String),
    Float(f32),
    Number(i32),
}

impl From<ConfigToken> for String {
    fn from(value: ConfigToken) -> Self {
        match value {
            ConfigToken::String(s) => s,
            _ => Default::default(),
        }
    }
}

impl From<ConfigToken> for f32 {
    fn from(value: ConfigToken) -> Self {
        match value {
            ConfigToken::Float(value) => value,
            ConfigToken::Number(value) => value as f32,
            _ => Default::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ConfigLine {
    /// 1-based line number in the source text.
    pub line_number: usize,
    pub key: String,
    params: Vec<ConfigToken>,
}

impl ConfigLine {
    pub fn param<T: From<ConfigToken> + Default>(&self, index: usize) -> T {
        self.params
            .get(index)
            .cloned()
            .map(T::from)
            .unwrap_or_default()
    }

    pub fn maybe_param<T: From<ConfigToken>>(&self, index: usize) -> Option<T> {
        self.params.get(index).map(|t| T::from(t.clone()))
    }

    pub fn string(&self, index: usize) -> String {
        self.param::<String>(index)
    }
}

fn parse_string(chars: &mut std::iter::Peekable<std::str::Chars>) -> Option<String> {
    while chars.peek().is_some_and(|c| c.is_whitespace()) {
        chars.next(); // Skip leading whitespace
    }

    let mut result = String::new();

    match chars.peek()? {
        '"' => {
            chars.next(); // Skip opening quote
            while let Some(&ch) = chars.peek() {
                chars.next();
                if ch == '"' {
                    break;
                }
                result.push(ch);
            }
        }
        _ => {
            while let Some(&ch) = chars.peek() {
                if ch.is_whitespace() {
                    break;
                }
                result.push(ch);
                chars.next();
            }
        }
    }

    Some(result)
}

fn parse_token(token: String) -> ConfigToken {
    if let Ok(num) = token.parse::<i32>() {
        ConfigToken::Number(num)
    } else if let Ok(num) = token.parse::<f32>() {
        ConfigToken::Float(num)
    } else {
        ConfigToken::String(token)
    }
}

pub fn parse_line(line_number: usize, line: &str) -> Option<ConfigLine> {
    let line = line.trim();
    if line.is_empty() || line.starts_with(';') {
        return None;
    }

    let mut chars = line.chars().peekable();

    let key = parse_string(&mut chars)?;

    let mut params = Vec::new();
    while let Some(param_str) = parse_string(&mut chars) {
        params.push(parse_token(param_str));
    }

    Some(ConfigLine {
        line_number,
        key,
        params,
    })
}

pub struct ConfigLines {
    lines: Vec<ConfigLine>,
}

impl ConfigLines {
    pub fn parse(s: &str) -> Self {
        Self {
            lines: s
                .lines()
                .enumerate()
                .filter_map(|(index, line)| parse_line(index + 1, line))
                .collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn into_iter(self) -> impl Iterator<Item = ConfigLine> {
        self.lines.into_iter()
    }
}
