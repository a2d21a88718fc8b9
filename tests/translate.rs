use std::io::Write;

use pretty_assertions::assert_eq;

use cathgvs::catalogue::CatalogueColumns;
use cathgvs::pipeline::{run, PipelineOpts};

fn write(dir: &tempfile::TempDir, name: &str, body: &str) -> std::path::PathBuf {
    let p = dir.path().join(name);
    let mut f = std::fs::File::create(&p).unwrap();
    f.write_all(body.as_bytes()).unwrap();
    p
}

#[test]
fn translates_catalogue_end_to_end() {
    let dir = tempfile::tempdir().unwrap();
    let gff = write(
        &dir,
        "genes.gff",
        "##gff-version 3\n\
         NC_000962.3\t.\tgene\t100\t500\t.\t+\t.\tName=rpoB;locus_tag=Rv0667\n\
         NC_000962.3\t.\tgene\t600\t900\t.\t-\t.\tName=katG;locus_tag=Rv1908c\n",
    );
    // index 108..111 holds the context for rpoB_10_del_2_g_g
    let mut seq = "A".repeat(108);
    seq.push_str("GCG");
    seq.push_str(&"T".repeat(889));
    let mut fasta = String::from(">NC_000962.3\n");
    for chunk in seq.as_bytes().chunks(60) {
        fasta.push_str(std::str::from_utf8(chunk).unwrap());
        fasta.push('\n');
    }
    let reference = write(&dir, "ref.fa", &fasta);
    let catalogue = write(
        &dir,
        "catalogue.csv",
        "drug,variant (common_name),Genome position,FINAL CONFIDENCE GRADING\n\
         RIF,rpoB_c-61t,39.0,1) Assoc w R\n\
         RIF,\"rpoB_S450L (rpoB_S531L, rpoB_S456L)\",1449.0,1) Assoc w R\n\
         INH,katG_315_ins_3_a_aacg,915.0,2) Assoc w R - Interim\n\
         RIF,rpoB_10_del_2_g_g,109.0,3) Uncertain significance\n\
         INH,katG_S315T,915.0,combo\n\
         INH,katG_LoF,,1) Assoc w R\n",
    );
    let output = dir.path().join("out.csv");

    let summary = run(&PipelineOpts {
        gff,
        reference,
        catalogue,
        output: output.clone(),
        threads: Some(2),
        columns: CatalogueColumns::default(),
    })
    .unwrap();
    assert_eq!((summary.rows, summary.imputed, summary.failed), (5, 1, 1));

    let mut rdr = csv::Reader::from_path(&output).unwrap();
    let headers: Vec<String> = rdr.headers().unwrap().iter().map(String::from).collect();
    assert_eq!(headers[..10].to_vec(), vec!["variant", "drug", "classification", "genome_position", "original_notation", "gene", "type", "hgvs", "fail", "fail_reason"]);
    let rows: Vec<Vec<String>> = rdr.records().map(|r| r.unwrap().iter().map(String::from).collect()).collect();
    assert_eq!(rows.len(), 5);

    assert_eq!(rows[0][..10].to_vec(), vec!["rpoB_c-61t", "RIF", "1", "39", "rpoB_c-61t", "rpoB", "c", "c.-61C>T", "false", ""]);
    assert_eq!(rows[1][0], "rpoB_S450L");
    assert_eq!(rows[1][4], "rpoB_S450L (rpoB_S531L, rpoB_S456L)");
    assert_eq!(rows[1][7], "p.Ser450Leu");
    assert_eq!(rows[2][7], "c.314_315insCGT");
    assert_eq!(rows[3][7], "c.11_12del");
    assert_eq!(rows[3][10], "rpoB_10_del_2_gcg_g");
    assert_eq!(rows[3][11], "false");
    assert_eq!(rows[4][8], "true");
    assert_eq!(rows[4][9], "does not match indel or variant");
}
