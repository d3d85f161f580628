use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result, bail};

use stockroom_core::{
    MaterialFilter, MaterialSortKey, NewMaterial, NewUser, SortDirection, Store, dashboard_stats,
    filter_and_sort_materials, policy, queue_order, requests_for_user,
};
use stockroom_export::{materials_csv, requests_csv};
use stockroom_model::{EntityId, RequestStatus, Role, User};

use crate::cli::{
    ExportArgs, ExportCollectionArg, LoginArgs, MaterialCommand, MaterialListArgs,
    MaterialSortArg, RequestCommand, RequestListArgs, RoleArg, UserCommand,
};
use crate::tables::{material_table, print_dashboard, request_table, user_table};
use stockroom_cli::session;

pub struct App {
    pub store: Store,
    pub session_file: PathBuf,
}

pub fn run_login(app: &mut App, args: &LoginArgs) -> Result<()> {
    let user = app.store.login(&args.username, &args.password)?;
    session::save(&app.session_file, &user)?;
    println!("Signed in as {} ({})", user.name, user.role);
    Ok(())
}

pub fn run_logout(app: &mut App) -> Result<()> {
    app.store.logout();
    session::clear(&app.session_file)?;
    println!("Signed out");
    Ok(())
}

pub fn run_whoami(app: &App) -> Result<()> {
    match app.store.current_user() {
        Some(user) => println!(
            "{} ({}) - {}, {}",
            user.username, user.role, user.name, user.department
        ),
        None => println!("Not signed in"),
    }
    Ok(())
}

pub fn run_dashboard(app: &App) -> Result<()> {
    require_admin(&app.store)?;
    let stats = dashboard_stats(app.store.state());
    let materials: Vec<_> = app.store.materials().iter().collect();
    print_dashboard(&stats, &materials);
    Ok(())
}

pub fn run_material(app: &mut App, command: &MaterialCommand) -> Result<()> {
    match command {
        MaterialCommand::List(args) => {
            require_user(&app.store)?;
            let rows = filter_and_sort_materials(
                app.store.materials(),
                &material_filter(args),
                material_sort(args),
            );
            println!("{}", material_table(&rows));
        }
        MaterialCommand::Add { name, stock, unit } => {
            require_admin(&app.store)?;
            let material = app.store.add_material(NewMaterial {
                name: name.clone(),
                stock: *stock,
                unit: unit.clone(),
            })?;
            println!("Added material {} ({})", material.id, material.name);
        }
        MaterialCommand::Update {
            id,
            name,
            stock,
            unit,
        } => {
            require_admin(&app.store)?;
            let id = EntityId(*id);
            let mut material = app
                .store
                .state()
                .material(id)
                .with_context(|| format!("material not found: {id}"))?
                .clone();
            if let Some(name) = name {
                material.name = name.clone();
            }
            if let Some(stock) = stock {
                material.stock = *stock;
            }
            if let Some(unit) = unit {
                material.unit = unit.clone();
            }
            app.store.update_material(material)?;
            println!("Updated material {id}");
        }
        MaterialCommand::Delete { id } => {
            require_admin(&app.store)?;
            app.store.delete_material(EntityId(*id))?;
            println!("Deleted material {id}");
        }
    }
    Ok(())
}

pub fn run_user(app: &mut App, command: &UserCommand) -> Result<()> {
    require_admin(&app.store)?;
    match command {
        UserCommand::List => {
            println!("{}", user_table(app.store.users()));
        }
        UserCommand::Add {
            name,
            department,
            username,
            password,
            role,
        } => {
            let user = app.store.add_user(NewUser {
                name: name.clone(),
                department: department.clone(),
                role: role_from(*role),
                username: username.clone(),
                password: password.clone(),
            })?;
            println!("Added user {} ({})", user.id, user.username);
        }
        UserCommand::Update {
            id,
            name,
            department,
            username,
            password,
            role,
        } => {
            let id = EntityId(*id);
            let mut user = app
                .store
                .state()
                .user(id)
                .with_context(|| format!("user not found: {id}"))?
                .clone();
            if let Some(name) = name {
                user.name = name.clone();
            }
            if let Some(department) = department {
                user.department = department.clone();
            }
            if let Some(username) = username {
                user.username = username.clone();
            }
            if let Some(password) = password {
                user.password = password.clone();
            }
            if let Some(role) = role {
                user.role = role_from(*role);
            }
            app.store.update_user(user)?;
            println!("Updated user {id}");
        }
        UserCommand::Delete { id } => {
            let id = EntityId(*id);
            let user = app
                .store
                .state()
                .user(id)
                .with_context(|| format!("user not found: {id}"))?;
            if !policy::can_delete_user(user) {
                bail!("admin accounts cannot be deleted");
            }
            app.store.delete_user(id)?;
            println!("Deleted user {id}");
        }
    }
    Ok(())
}

pub fn run_request(app: &mut App, command: &RequestCommand) -> Result<()> {
    match command {
        RequestCommand::List(RequestListArgs { mine: true }) => {
            let user = require_user(&app.store)?;
            let rows = requests_for_user(app.store.requests(), user.id);
            println!("{}", request_table(&rows, app.store.state()));
        }
        RequestCommand::List(RequestListArgs { mine: false }) => {
            require_admin(&app.store)?;
            let rows = queue_order(app.store.requests());
            println!("{}", request_table(&rows, app.store.state()));
        }
        RequestCommand::Create {
            material_id,
            quantity,
        } => {
            let user = require_user(&app.store)?;
            let request = app
                .store
                .create_request(user.id, EntityId(*material_id), *quantity)?;
            println!(
                "Request {} created ({} x material {})",
                request.id, request.quantity, request.material_id
            );
        }
        RequestCommand::Approve { id } => {
            transition(app, *id, RequestStatus::Approved)?;
        }
        RequestCommand::Reject { id } => {
            transition(app, *id, RequestStatus::Rejected)?;
        }
        RequestCommand::Issue { id } => {
            transition(app, *id, RequestStatus::Issued)?;
        }
    }
    Ok(())
}

fn transition(app: &mut App, id: u64, target: RequestStatus) -> Result<()> {
    require_admin(&app.store)?;
    let outcome = app.store.transition(EntityId(id), target)?;
    println!("{}", outcome.message());
    Ok(())
}

pub fn run_export(app: &App, args: &ExportArgs) -> Result<()> {
    require_admin(&app.store)?;
    let state = app.store.state();
    let (csv, records) = match args.collection {
        ExportCollectionArg::Material => {
            (materials_csv(&state.materials)?, state.materials.len())
        }
        ExportCollectionArg::Request => {
            let rows = queue_order(&state.requests);
            (requests_csv(rows, state)?, state.requests.len())
        }
    };
    if let Some(parent) = args.output.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent)
            .with_context(|| format!("create directory {}", parent.display()))?;
    }
    fs::write(&args.output, csv)
        .with_context(|| format!("write {}", args.output.display()))?;
    println!("Exported {} records to {}", records, args.output.display());
    Ok(())
}

fn require_user(store: &Store) -> Result<User> {
    store
        .current_user()
        .cloned()
        .context("not signed in (run `stockroom login <username> <password>`)")
}

fn require_admin(store: &Store) -> Result<User> {
    let user = require_user(store)?;
    if !user.is_admin() {
        bail!("{} is not an administrator", user.username);
    }
    Ok(user)
}

fn material_filter(args: &MaterialListArgs) -> MaterialFilter {
    MaterialFilter {
        name: args.name.clone(),
        stock: args.stock.clone(),
        unit: args.unit.clone(),
    }
}

fn material_sort(args: &MaterialListArgs) -> Option<(MaterialSortKey, SortDirection)> {
    let key = match args.sort? {
        MaterialSortArg::Id => MaterialSortKey::Id,
        MaterialSortArg::Name => MaterialSortKey::Name,
        MaterialSortArg::Stock => MaterialSortKey::Stock,
        MaterialSortArg::Unit => MaterialSortKey::Unit,
    };
    let direction = if args.desc {
        SortDirection::Descending
    } else {
        SortDirection::Ascending
    };
    Some((key, direction))
}

fn role_from(role: RoleArg) -> Role {
    match role {
        RoleArg::Admin => Role::Admin,
        RoleArg::User => Role::User,
    }
}
