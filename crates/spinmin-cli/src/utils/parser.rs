use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParseError {
    #[error("Invalid vector '{0}'. Expected three comma-separated numbers (e.g., '0,0,1').")]
    InvalidVector(String),

    #[error("Component '{component}' of vector '{value}' is not a finite number.")]
    InvalidComponent { component: String, value: String },
}

/// Parses `x,y,z` into a 3-vector. Whitespace around components is ignored.
pub fn parse_vector(value: &str) -> Result<[f64; 3], ParseError> {
    let parts: Vec<&str> = value.split(',').map(str::trim).collect();
    let [x, y, z] = parts[..] else {
        return Err(ParseError::InvalidVector(value.to_string()));
    };

    let component = |c: &str| {
        c.parse::<f64>()
            .ok()
            .filter(|v| v.is_finite())
            .ok_or_else(|| ParseError::InvalidComponent {
                component: c.to_string(),
                value: value.to_string(),
            })
    };
    Ok([component(x)?, component(y)?, component(z)?])
}

/// Splits a comma-separated list, dropping empty entries.
pub fn parse_name_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}
