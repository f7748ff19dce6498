/// CommandTuple is a tuple that contains the leading command words, the
/// Command variant, and a description of the command.
type CommandTuple = (&'static [&'static str], Command, &'static str);

/// The list of all commands the dispatcher recognizes. Any new command must
/// be added here and have the corresponding variant added to the Command
/// enum. Two-word forms must precede one-word forms that share a prefix.
const COMMANDS: [CommandTuple; 9] = [
    (
        &["create", "type"],
        Command::CreateType,
        "Define a new type: create type <name> <fields> <pk_pos> <f1> <t1> ...",
    ),
    (
        &["delete", "type"],
        Command::DeleteType,
        "Delete a type, all of its records and its index: delete type <name>",
    ),
    (
        &["list", "type"],
        Command::ListType,
        "List all type names in ascending order",
    ),
    (
        &["create", "record"],
        Command::CreateRecord,
        "Insert a record: create record <type> <v1> ... <vF>",
    ),
    (
        &["delete", "record"],
        Command::DeleteRecord,
        "Delete a record by primary key: delete record <type> <key>",
    ),
    (
        &["list", "record"],
        Command::ListRecord,
        "List all records of a type ordered by primary key: list record <type>",
    ),
    (
        &["update"],
        Command::Update,
        "Overwrite a record in place: update <type> <key> <v1> ... <vF>",
    ),
    (
        &["search"],
        Command::Search,
        "Emit the record with the given primary key: search <type> <key>",
    ),
    (
        &["filter"],
        Command::Filter,
        "Emit records matching a primary-key condition: filter <type> <cond>",
    ),
];

/// The nine operations of the command language.
#[derive(Debug, PartialEq, Eq, Serialize, Deserialize, Clone, Copy)]
pub enum Command {
    CreateType,
    DeleteType,
    ListType,
    CreateRecord,
    DeleteRecord,
    Update,
    Search,
    ListRecord,
    Filter,
}

#[derive(Debug, PartialEq, Serialize, Deserialize)]
pub struct CommandWithArgs {
    pub command: Command,
    /// Remaining tokens after the command words, in order.
    pub args: Vec<String>,
}

/// Classify a raw input line by its leading tokens. Returns None for lines
/// that match no command; blank lines are the caller's concern.
pub fn parse_command(line: &str) -> Option<CommandWithArgs> {
    let tokens: Vec<&str> = line.split_whitespace().collect();
    for (words, command, _) in COMMANDS.iter() {
        if tokens.len() < words.len() {
            continue;
        }
        if tokens[..words.len()] == **words {
            return Some(CommandWithArgs {
                command: *command,
                args: tokens[words.len()..].iter().map(|t| t.to_string()).collect(),
            });
        }
    }
    None
}

pub fn gen_help_string() -> String {
    let mut help = String::from("Commands:\n");
    for (words, _, description) in COMMANDS.iter() {
        help.push_str(&format!("{}: {}\n", words.join(" "), description));
    }
    help
}
