use report_cards::workflows::bulletins::{BulletinPipeline, PipelineOptions, ProfileKind, RunSummary};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

const SEED: u64 = 20_252_026;

fn write_fixture(dir: &Path, name: &str, contents: &str) {
    fs::write(dir.join(name), contents).expect("write fixture");
}

/// Two subjects, three students: Jean has an identity row, Lina has one
/// without a birth date, Tom has none at all.
fn class_exports() -> TempDir {
    let dir = tempfile::tempdir().expect("temp dir");
    write_fixture(
        dir.path(),
        "maths.csv",
        "Nom,Prénom,Email,Note\nDupont,Jean,jean@example.org,15/20\nMartin,Lina,,\nRoux,Tom,tom@example.org,\"8,5\"\n",
    );
    write_fixture(
        dir.path(),
        "biochimie.csv",
        "NOM,PRENOM,E-mail,Note /20\ndupont,jean,,12\nMARTIN,lina,lina@example.org,17.5\n",
    );
    write_fixture(
        dir.path(),
        "identite.csv",
        "Nom,Prénom,Date de naissance,Choix Parcoursup\nDupont,Jean,04/03/2007,Diploma Santé PAES\nMartin,Lina,,Linova LAS\n",
    );
    dir
}

fn options(data_dir: &Path, output_dir: PathBuf) -> PipelineOptions {
    PipelineOptions {
        data_dir: data_dir.to_path_buf(),
        output_dir,
        template_dir: None,
        seed: SEED,
        pdf_command: None,
        reset: false,
    }
}

fn run(options: PipelineOptions) -> RunSummary {
    BulletinPipeline::new(options).run().expect("pipeline runs")
}

fn html_path(root: &Path, kind: ProfileKind, slug: &str) -> PathBuf {
    root.join(kind.slug())
        .join("html")
        .join(format!("bulletin_{slug}.html"))
}

fn profile(summary: &RunSummary, kind: ProfileKind) -> (usize, usize, usize) {
    let entry = summary
        .profiles
        .iter()
        .find(|profile| profile.kind == kind)
        .expect("profile summarized");
    (entry.generated, entry.skipped, entry.failed.len())
}

#[test]
fn run_writes_every_profile_and_the_index() {
    let data = class_exports();
    let out = tempfile::tempdir().expect("temp dir");

    let summary = run(options(data.path(), out.path().to_path_buf()));

    assert_eq!(summary.students, 3);
    assert_eq!(profile(&summary, ProfileKind::Paes), (3, 0, 0));
    assert_eq!(profile(&summary, ProfileKind::Linova), (3, 0, 0));
    for kind in ProfileKind::ordered() {
        for slug in ["jean_dupont", "lina_martin", "tom_roux"] {
            assert!(html_path(out.path(), kind, slug).exists(), "{slug} for {}", kind.label());
        }
    }

    let index = fs::read_to_string(&summary.index_path).expect("index written");
    assert!(index.contains("Dupont"));
    assert!(index.contains("paes/html/bulletin_jean_dupont.html"));
    assert!(index.contains("linova/html/bulletin_tom_roux.html"));
    // Lina lacks a birth date and Tom has no identity row.
    assert_eq!(index.matches("class=\"badge\"").count(), 2);
}

#[test]
fn same_seed_reproduces_identical_documents() {
    let data = class_exports();
    let first = tempfile::tempdir().expect("temp dir");
    let second = tempfile::tempdir().expect("temp dir");

    run(options(data.path(), first.path().to_path_buf()));
    run(options(data.path(), second.path().to_path_buf()));

    for kind in ProfileKind::ordered() {
        for slug in ["jean_dupont", "lina_martin", "tom_roux"] {
            let a = fs::read_to_string(html_path(first.path(), kind, slug)).expect("first run");
            let b = fs::read_to_string(html_path(second.path(), kind, slug)).expect("second run");
            assert_eq!(a, b, "{slug} differs for {}", kind.label());
        }
    }
}

#[test]
fn rerun_only_fills_in_missing_documents() {
    let data = class_exports();
    let out = tempfile::tempdir().expect("temp dir");
    run(options(data.path(), out.path().to_path_buf()));

    let paes_jean = html_path(out.path(), ProfileKind::Paes, "jean_dupont");
    fs::write(&paes_jean, "kept as is").expect("mark existing document");
    let linova_lina = html_path(out.path(), ProfileKind::Linova, "lina_martin");
    fs::remove_file(&linova_lina).expect("remove one document");

    let summary = run(options(data.path(), out.path().to_path_buf()));

    assert_eq!(profile(&summary, ProfileKind::Paes), (0, 3, 0));
    assert_eq!(profile(&summary, ProfileKind::Linova), (1, 2, 0));
    assert!(linova_lina.exists());
    assert_eq!(fs::read_to_string(&paes_jean).expect("still there"), "kept as is");
}

#[test]
fn reset_regenerates_everything() {
    let data = class_exports();
    let out = tempfile::tempdir().expect("temp dir");
    run(options(data.path(), out.path().to_path_buf()));

    let paes_jean = html_path(out.path(), ProfileKind::Paes, "jean_dupont");
    fs::write(&paes_jean, "stale").expect("mark existing document");

    let mut reset = options(data.path(), out.path().to_path_buf());
    reset.reset = true;
    let summary = run(reset);

    assert_eq!(profile(&summary, ProfileKind::Paes), (3, 0, 0));
    assert_eq!(profile(&summary, ProfileKind::Linova), (3, 0, 0));
    assert_ne!(fs::read_to_string(&paes_jean).expect("regenerated"), "stale");
}

#[test]
fn both_profiles_print_the_same_numbers() {
    let data = class_exports();
    let out = tempfile::tempdir().expect("temp dir");
    let templates = tempfile::tempdir().expect("temp dir");

    let mut numbers = String::new();
    for i in 1..=9 {
        numbers.push_str(&format!(
            "{{{{MOY_ELEVE_{i}}}}};{{{{MOY_CLASSE_{i}}}}};{{{{NOTE_MIN_{i}}}}};{{{{NOTE_MAX_{i}}}}}\n"
        ));
    }
    numbers.push_str("{{MOYENNE_GENERALE_ELEVE}};{{MOYENNE_GENERALE_CLASSE}}\n");
    let template = format!("{{{{MATIERE_1}}}}\n---\n{numbers}");
    write_fixture(templates.path(), "paes.html", &template);
    write_fixture(templates.path(), "linova.html", &template);

    let mut with_templates = options(data.path(), out.path().to_path_buf());
    with_templates.template_dir = Some(templates.path().to_path_buf());
    run(with_templates);

    for slug in ["jean_dupont", "lina_martin", "tom_roux"] {
        let paes = fs::read_to_string(html_path(out.path(), ProfileKind::Paes, slug)).expect("paes");
        let linova =
            fs::read_to_string(html_path(out.path(), ProfileKind::Linova, slug)).expect("linova");

        let (paes_name, paes_numbers) = paes.split_once("---").expect("separator");
        let (linova_name, linova_numbers) = linova.split_once("---").expect("separator");
        assert_ne!(paes_name, linova_name, "subject names are profile specific");
        assert_eq!(paes_numbers, linova_numbers, "numbers differ for {slug}");
    }

    let jean = fs::read_to_string(html_path(out.path(), ProfileKind::Paes, "jean_dupont"))
        .expect("paes");
    assert!(!jean.contains("NN"), "every subject gets an adjusted score");
}

#[test]
fn stats_preparation_writes_nothing() {
    let data = class_exports();
    let out = tempfile::tempdir().expect("temp dir");
    let target = out.path().join("never");

    let pipeline = BulletinPipeline::new(options(data.path(), target.clone()));
    let prepared = pipeline.prepare().expect("prepares");

    assert_eq!(prepared.students.len(), 3);
    let paes = prepared.stats_for(ProfileKind::Paes).expect("paes stats");
    let linova = prepared.stats_for(ProfileKind::Linova).expect("linova stats");
    assert_eq!(paes.overall_average, linova.overall_average);
    assert!(!target.exists());
}
