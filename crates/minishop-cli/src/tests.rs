use super::*;

#[test]
fn no_command_is_none() {
    let cli = Cli::try_parse_from(["minishop"]).expect("expected valid cli args");
    assert!(cli.command.is_none());
}

#[test]
fn parses_catalog_with_search_and_desc() {
    let cli = Cli::try_parse_from(["minishop", "catalog", "--search", "rose", "--desc"]).unwrap();
    assert!(matches!(
        cli.command,
        Some(Commands::Catalog {
            search: Some(ref s),
            desc: true
        }) if s == "rose"
    ));
}

#[test]
fn add_defaults_to_one_unit() {
    let cli = Cli::try_parse_from(["minishop", "add", "12"]).unwrap();
    assert!(matches!(
        cli.command,
        Some(Commands::Add { ref id, quantity: 1 }) if id == "12"
    ));
}

#[test]
fn add_accepts_quantity() {
    let cli = Cli::try_parse_from(["minishop", "add", "rose-50", "-q", "3"]).unwrap();
    assert!(matches!(cli.command, Some(Commands::Add { quantity: 3, .. })));
}

#[test]
fn adjust_accepts_negative_delta() {
    let cli = Cli::try_parse_from(["minishop", "adjust", "7", "-99"]).unwrap();
    assert!(matches!(
        cli.command,
        Some(Commands::Adjust { ref id, delta: -99 }) if id == "7"
    ));
}

#[test]
fn order_copy_flag() {
    let cli = Cli::try_parse_from(["minishop", "order", "--copy"]).unwrap();
    assert!(matches!(cli.command, Some(Commands::Order { copy: true })));
}

#[test]
fn show_takes_quantity_preview() {
    let cli = Cli::try_parse_from(["minishop", "show", "4", "--quantity", "5"]).unwrap();
    assert!(matches!(
        cli.command,
        Some(Commands::Show { quantity: 5, .. })
    ));
}

#[test]
fn identity_flags_are_global() {
    let cli = Cli::try_parse_from([
        "minishop",
        "checkout",
        "--user-id",
        "123456",
        "--first-name",
        "Anna",
        "--username",
        "@anna_k",
    ])
    .unwrap();
    assert!(matches!(cli.command, Some(Commands::Checkout)));

    let identity = cli.identity.into_identity();
    assert_eq!(identity.id, UserId::new("123456"));
    assert_eq!(identity.first_name.as_deref(), Some("Anna"));
    assert_eq!(identity.username.as_deref(), Some("anna_k"));
}

#[test]
fn blank_user_id_is_anonymous() {
    let args = IdentityArgs {
        user_id: Some("  ".into()),
        first_name: None,
        last_name: None,
        username: Some("@".into()),
    };
    let identity = args.into_identity();
    assert!(identity.is_anonymous());
    assert!(identity.username.is_none());
}
