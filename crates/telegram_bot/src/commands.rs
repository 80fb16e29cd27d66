//! Command router.
//!
//! Turns the raw text of a message into a typed [`Command`]. Parsing never
//! talks to the engine; it only decides which operation the text asks for.

use engine::Money;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Command {
    Start,
    Help,
    Categories,
    Today,
    Week,
    Month,
    Stats,
    AddCategory {
        name: String,
        color: Option<String>,
    },
    DeleteCategory {
        id: i64,
    },
    AddExpense {
        amount: Money,
        category: String,
        description: String,
    },
}

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    #[error("unknown command")]
    Unknown,
    #[error("missing category name")]
    MissingCategoryName,
    #[error("missing category id")]
    MissingCategoryId,
    #[error("invalid category id")]
    InvalidId,
    #[error("missing parameters")]
    MissingParameters,
    #[error("invalid amount")]
    InvalidAmount,
}

impl ParseError {
    /// Reply shown to the user.
    pub fn user_message(&self) -> &'static str {
        match self {
            ParseError::Unknown => "❓ Unknown command. Send /help to see what I can do.",
            ParseError::MissingCategoryName => {
                "❌ Please give the category a name: /category add <name> [color]"
            }
            ParseError::MissingCategoryId => {
                "❌ Please give the category ID: /category delete <id>"
            }
            ParseError::InvalidId => "❌ Invalid category ID, it must be a positive number",
            ParseError::MissingParameters => {
                "❌ Not enough parameters.\nUsage: /add <amount> <category> <description>"
            }
            ParseError::InvalidAmount => {
                "❌ Invalid amount, it must be a positive number.\nExample: /add 250.50 Food lunch"
            }
        }
    }
}

/// Parses a message into a command.
///
/// Words are split on any whitespace. A `@botname` suffix on the command word
/// is ignored so commands work in group chats too.
pub fn parse(text: &str) -> Result<Command, ParseError> {
    let mut words = text.split_whitespace();
    let head = words.next().ok_or(ParseError::Unknown)?;
    let head = head.split_once('@').map_or(head, |(command, _)| command);
    let args: Vec<&str> = words.collect();

    let exact = |command: Command| {
        if args.is_empty() {
            Ok(command)
        } else {
            Err(ParseError::Unknown)
        }
    };

    match head {
        "/start" => exact(Command::Start),
        "/help" => exact(Command::Help),
        "/categories" => exact(Command::Categories),
        "/today" => exact(Command::Today),
        "/week" => exact(Command::Week),
        "/month" => exact(Command::Month),
        "/stats" => exact(Command::Stats),
        "/category" => parse_category(&args),
        "/add" => parse_expense(&args),
        _ => Err(ParseError::Unknown),
    }
}

fn parse_category(args: &[&str]) -> Result<Command, ParseError> {
    match args {
        ["add"] => Err(ParseError::MissingCategoryName),
        ["add", name] => Ok(Command::AddCategory {
            name: name.to_string(),
            color: None,
        }),
        ["add", name, color, ..] => Ok(Command::AddCategory {
            name: name.to_string(),
            color: Some(color.to_string()),
        }),
        ["delete"] => Err(ParseError::MissingCategoryId),
        ["delete", id, ..] => match id.parse::<i64>() {
            Ok(id) if id > 0 => Ok(Command::DeleteCategory { id }),
            _ => Err(ParseError::InvalidId),
        },
        _ => Err(ParseError::Unknown),
    }
}

fn parse_expense(args: &[&str]) -> Result<Command, ParseError> {
    let [amount, category, description @ ..] = args else {
        return Err(ParseError::MissingParameters);
    };
    if description.is_empty() {
        return Err(ParseError::MissingParameters);
    }

    let amount: Money = amount.parse().map_err(|_| ParseError::InvalidAmount)?;
    if !amount.is_positive() {
        return Err(ParseError::InvalidAmount);
    }

    Ok(Command::AddExpense {
        amount,
        category: category.to_string(),
        description: description.join(" "),
    })
}

/// Text of `/help`.
pub fn help_text() -> &'static str {
    "📖 Available commands:\n\n\
     /start - register and create the default categories\n\
     /help - show this message\n\n\
     📂 Categories:\n\
     /category add <name> [color] - create a category\n\
     /categories - list your categories\n\
     /category delete <id> - delete a category, its expenses move to \"Other\"\n\n\
     💰 Expenses:\n\
     /add <amount> <category> <description> - record an expense\n\n\
     📊 Reports:\n\
     /today - expenses of today\n\
     /week - expenses of this week\n\
     /month - expenses of this month\n\
     /stats - all-time statistics"
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exact_commands() {
        assert_eq!(parse("/start"), Ok(Command::Start));
        assert_eq!(parse("  /stats  "), Ok(Command::Stats));
        assert_eq!(parse("/today@tally_bot"), Ok(Command::Today));
        assert_eq!(parse("/week extra"), Err(ParseError::Unknown));
    }

    #[test]
    fn unknown_text_points_to_help() {
        let err = parse("hello there").unwrap_err();
        assert_eq!(err, ParseError::Unknown);
        assert!(err.user_message().contains("/help"));
        assert_eq!(parse(""), Err(ParseError::Unknown));
        assert_eq!(parse("/category"), Err(ParseError::Unknown));
        assert_eq!(parse("/category rename 3"), Err(ParseError::Unknown));
    }

    #[test]
    fn category_add_with_optional_color() {
        assert_eq!(
            parse("/category add Sport"),
            Ok(Command::AddCategory {
                name: "Sport".to_string(),
                color: None
            })
        );
        assert_eq!(
            parse("/category add Sport green"),
            Ok(Command::AddCategory {
                name: "Sport".to_string(),
                color: Some("green".to_string())
            })
        );
        assert_eq!(
            parse("/category add"),
            Err(ParseError::MissingCategoryName)
        );
    }

    #[test]
    fn category_delete_needs_positive_id() {
        assert_eq!(
            parse("/category delete 7"),
            Ok(Command::DeleteCategory { id: 7 })
        );
        assert_eq!(parse("/category delete"), Err(ParseError::MissingCategoryId));
        assert_eq!(parse("/category delete abc"), Err(ParseError::InvalidId));
        assert_eq!(parse("/category delete 0"), Err(ParseError::InvalidId));
        assert_eq!(parse("/category delete -2"), Err(ParseError::InvalidId));
    }

    #[test]
    fn category_ignores_trailing_words() {
        assert_eq!(
            parse("/category add Sport green extra words"),
            Ok(Command::AddCategory {
                name: "Sport".to_string(),
                color: Some("green".to_string())
            })
        );
        assert_eq!(
            parse("/category delete 5 x"),
            Ok(Command::DeleteCategory { id: 5 })
        );
        assert_eq!(parse("/category delete x 5"), Err(ParseError::InvalidId));
    }

    #[test]
    fn add_rejoins_description() {
        assert_eq!(
            parse("/add 250,50 Food   lunch with   friends"),
            Ok(Command::AddExpense {
                amount: Money::new(25_050),
                category: "Food".to_string(),
                description: "lunch with friends".to_string(),
            })
        );
    }

    #[test]
    fn add_needs_three_arguments() {
        assert_eq!(parse("/add"), Err(ParseError::MissingParameters));
        assert_eq!(parse("/add 10 Food"), Err(ParseError::MissingParameters));
    }

    #[test]
    fn add_rejects_bad_amounts() {
        assert_eq!(parse("/add ten Food tea"), Err(ParseError::InvalidAmount));
        assert_eq!(parse("/add 0 Food tea"), Err(ParseError::InvalidAmount));
        assert_eq!(parse("/add -5 Food tea"), Err(ParseError::InvalidAmount));
        assert_eq!(parse("/add 1.234 Food tea"), Err(ParseError::InvalidAmount));
    }
}
