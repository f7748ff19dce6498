use crate::database_state::DatabaseState;
use common::commands::{Command, CommandWithArgs};
use common::prelude::*;
use heapstore::heap_page::payload_fits;
use index::{BPlusTree, Condition};
use itertools::Itertools;

/// Dispatch one parsed command against the database state.
///
/// On success the returned lines are what the driver emits to the result
/// stream (often none). On error nothing has been mutated: every operation
/// validates type existence, index presence, key presence or absence, and
/// payload width before its first write, so a rejected command leaves the
/// heap and the index exactly as they were.
pub fn handle_command(
    db: &DatabaseState,
    cmd: &CommandWithArgs,
) -> Result<Vec<String>, HoradrimError> {
    debug!("handling {:?}", cmd);
    match cmd.command {
        Command::CreateType => create_type(db, &cmd.args).map(|_| Vec::new()),
        Command::DeleteType => delete_type(db, &cmd.args).map(|_| Vec::new()),
        Command::ListType => list_type(db),
        Command::CreateRecord => create_record(db, &cmd.args).map(|_| Vec::new()),
        Command::DeleteRecord => delete_record(db, &cmd.args).map(|_| Vec::new()),
        Command::Update => update(db, &cmd.args).map(|_| Vec::new()),
        Command::Search => search(db, &cmd.args),
        Command::ListRecord => list_record(db, &cmd.args),
        Command::Filter => filter(db, &cmd.args),
    }
}

fn arg<'a>(args: &'a [String], i: usize, what: &str) -> Result<&'a str, HoradrimError> {
    args.get(i)
        .map(|s| s.as_str())
        .ok_or_else(|| h_err(&format!("missing {}", what)))
}

/// Resolve a key to its physical locator through a loaded tree.
fn locate(tree: &BPlusTree, key: &str) -> Result<Locator, HoradrimError> {
    let values = tree
        .retrieve(key)
        .ok_or_else(|| HoradrimError::UnknownKey(key.to_string()))?;
    values
        .first()
        .ok_or_else(|| HoradrimError::StorageError(format!("key {} has no locator", key)))?
        .parse()
}

/// `create type T F ord f1 t1 ... fF tF`
fn create_type(db: &DatabaseState, args: &[String]) -> Result<(), HoradrimError> {
    let name = arg(args, 0, "type name")?;
    if db.lookup_type(name)?.is_some() {
        return Err(HoradrimError::DuplicateType(name.to_string()));
    }

    let field_count: usize = arg(args, 1, "field count")?
        .parse()
        .map_err(|_| h_err("malformed field count"))?;
    let pk_position: usize = arg(args, 2, "primary key position")?
        .parse()
        .map_err(|_| h_err("malformed primary key position"))?;
    let mut attributes = Vec::with_capacity(field_count);
    for i in 0..field_count {
        let fname = arg(args, 3 + 2 * i, "field name")?;
        let ftype = arg(args, 4 + 2 * i, "field type")?.parse()?;
        attributes.push(Attribute::new(fname.to_string(), ftype));
    }
    let info = TypeInfo::new(name.to_string(), pk_position, TypeSchema::new(attributes))?;
    if !payload_fits(&info.to_catalog_line()) {
        return Err(HoradrimError::StorageError(format!(
            "type definition for {} overflows a catalog slot",
            name
        )));
    }

    db.insert_type(&info)?;
    db.im.create(name)?;
    info!("created type {}", name);
    Ok(())
}

/// `delete type T`. The type's records and index file go with it.
fn delete_type(db: &DatabaseState, args: &[String]) -> Result<(), HoradrimError> {
    let name = arg(args, 0, "type name")?;
    let (cat_loc, info) = db.get_type(name)?;
    let tree = db.im.load(name, info.pk_dtype())?;

    for key in tree.keys() {
        let loc = locate(&tree, key)?;
        db.sm.free_slot(&loc)?;
    }
    db.sm.free_slot(&cat_loc)?;
    db.im.drop_index(name)?;
    info!("deleted type {} and {} records", name, tree.len());
    Ok(())
}

/// `list type`: all names, ascending.
fn list_type(db: &DatabaseState) -> Result<Vec<String>, HoradrimError> {
    let mut names = db.type_names()?;
    if names.is_empty() {
        return Err(HoradrimError::EmptyResult);
    }
    names.sort();
    Ok(names)
}

/// `create record T v1 ... vF`. The primary key is the value at the
/// type's declared ordinal.
fn create_record(db: &DatabaseState, args: &[String]) -> Result<(), HoradrimError> {
    let name = arg(args, 0, "type name")?;
    let (_, info) = db.get_type(name)?;
    let tree = db.im.load(name, info.pk_dtype())?;
    let key = arg(args, info.pk_position, "primary key value")?;
    if tree.contains(key) {
        return Err(HoradrimError::DuplicateKey(key.to_string()));
    }

    // Payload is the type name followed by every field value.
    let payload = args.join(" ");
    if !payload_fits(&payload) {
        return Err(HoradrimError::StorageError(format!(
            "record for {} overflows a slot",
            name
        )));
    }

    let loc = db.sm.allocate(FileFamily::Records)?;
    db.sm.write_slot(&loc, &payload)?;
    db.im.append_entry(name, key, &loc)?;
    Ok(())
}

/// `delete record T k`
fn delete_record(db: &DatabaseState, args: &[String]) -> Result<(), HoradrimError> {
    let name = arg(args, 0, "type name")?;
    let key = arg(args, 1, "primary key")?;
    let (_, info) = db.get_type(name)?;
    let tree = db.im.load(name, info.pk_dtype())?;
    let loc = locate(&tree, key)?;

    db.sm.free_slot(&loc)?;
    db.im.remove_key(name, key)?;
    Ok(())
}

/// `update T k v1 ... vF`: overwrite in place. The caller must preserve
/// the primary-key value; it is not re-validated here.
fn update(db: &DatabaseState, args: &[String]) -> Result<(), HoradrimError> {
    let name = arg(args, 0, "type name")?;
    let key = arg(args, 1, "primary key")?;
    let (_, info) = db.get_type(name)?;
    let tree = db.im.load(name, info.pk_dtype())?;
    let loc = locate(&tree, key)?;

    let payload = std::iter::once(name)
        .chain(args[2..].iter().map(|s| s.as_str()))
        .join(" ");
    if !payload_fits(&payload) {
        return Err(HoradrimError::StorageError(format!(
            "record for {} overflows a slot",
            name
        )));
    }
    db.sm.write_slot(&loc, &payload)?;
    Ok(())
}

/// `search T k`: the record's field values, space-joined.
fn search(db: &DatabaseState, args: &[String]) -> Result<Vec<String>, HoradrimError> {
    let name = arg(args, 0, "type name")?;
    let key = arg(args, 1, "primary key")?;
    let (_, info) = db.get_type(name)?;
    let tree = db.im.load(name, info.pk_dtype())?;
    let loc = locate(&tree, key)?;
    Ok(vec![db.record_fields(&loc)?.join(" ")])
}

/// `list record T`: every record, ordered by primary key under its dtype.
fn list_record(db: &DatabaseState, args: &[String]) -> Result<Vec<String>, HoradrimError> {
    let name = arg(args, 0, "type name")?;
    let (_, info) = db.get_type(name)?;
    let tree = db.im.load(name, info.pk_dtype())?;
    if tree.is_empty() {
        return Err(HoradrimError::EmptyResult);
    }

    let mut out = Vec::with_capacity(tree.len());
    for key in tree.keys() {
        let loc = locate(&tree, key)?;
        out.push(db.record_fields(&loc)?.join(" "));
    }
    Ok(out)
}

/// `filter T cond`: records whose primary key satisfies `=v`, `<v` or `>v`,
/// ascending by key.
fn filter(db: &DatabaseState, args: &[String]) -> Result<Vec<String>, HoradrimError> {
    let name = arg(args, 0, "type name")?;
    let cond: Condition = arg(args, 1, "filter condition")?.parse()?;
    let (_, info) = db.get_type(name)?;
    let tree = db.im.load(name, info.pk_dtype())?;

    let keys = tree.matching_keys(&cond);
    if keys.is_empty() {
        return Err(HoradrimError::EmptyResult);
    }
    let mut out = Vec::with_capacity(keys.len());
    for key in &keys {
        let loc = locate(&tree, key)?;
        out.push(db.record_fields(&loc)?.join(" "));
    }
    Ok(out)
}
