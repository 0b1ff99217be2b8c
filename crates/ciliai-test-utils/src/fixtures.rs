/// Two PubMed articles: the first mentions IFT88 with ciliary keywords, the second neither.
pub const PUBMED_TWO_ARTICLES: &str = r#"<?xml version="1.0" ?>
<!DOCTYPE PubmedArticleSet PUBLIC "-//NLM//DTD PubMedArticle, 1st January 2024//EN" "https://dtd.nlm.nih.gov/ncbi/pubmed/out/pubmed_240101.dtd">
<PubmedArticleSet>
  <PubmedArticle>
    <MedlineCitation Status="MEDLINE" Owner="NLM">
      <PMID Version="1">10882118</PMID>
      <Article PubModel="Print">
        <ArticleTitle>Intraflagellar transport in mammalian kidney epithelia.</ArticleTitle>
        <Abstract>
          <AbstractText Label="BACKGROUND">Primary cilia are sensory organelles.</AbstractText>
          <AbstractText Label="RESULTS">Loss of IFT88 resulted in shorter cilia and fewer ciliated cells.</AbstractText>
        </Abstract>
      </Article>
    </MedlineCitation>
  </PubmedArticle>
  <PubmedArticle>
    <MedlineCitation Status="MEDLINE" Owner="NLM">
      <PMID Version="1">20000001</PMID>
      <Article PubModel="Print">
        <ArticleTitle>Hepatic lipid metabolism in aging mice.</ArticleTitle>
        <Abstract>
          <AbstractText>Serum triglycerides were measured across cohorts.</AbstractText>
        </Abstract>
      </Article>
    </MedlineCitation>
  </PubmedArticle>
</PubmedArticleSet>"#;

/// A PubMed article with no PMID element.
pub const PUBMED_MISSING_PMID: &str = r#"<PubmedArticleSet>
  <PubmedArticle>
    <MedlineCitation>
      <Article>
        <ArticleTitle>Untitled cilia report</ArticleTitle>
        <Abstract><AbstractText>BBS1 mutants show longer cilia.</AbstractText></Abstract>
      </Article>
    </MedlineCitation>
  </PubmedArticle>
</PubmedArticleSet>"#;

/// A PMC full-text article mentioning BBS1 in body paragraphs and a figure caption.
pub const PMC_ARTICLE: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<!DOCTYPE pmc-articleset PUBLIC "-//NLM//DTD ARTICLE SET 2.0//EN" "https://dtd.nlm.nih.gov/ncbi/pmc/articleset/nlm-articleset-2.0.dtd">
<pmc-articleset>
  <article xmlns:xlink="http://www.w3.org/1999/xlink" article-type="research-article">
    <front>
      <article-meta>
        <article-id pub-id-type="pmid">31000000</article-id>
        <article-id pub-id-type="pmc">6500001</article-id>
        <article-id pub-id-type="doi">10.1000/cilia.2019.1</article-id>
        <title-group>
          <article-title>BBSome function in <italic>ciliary</italic> length control</article-title>
        </title-group>
        <abstract><p>We studied BBS1 in RPE1 cells.</p></abstract>
      </article-meta>
    </front>
    <body>
      <sec sec-type="results">
        <title>Results</title>
        <p>RPE1 cells were cultured under serum starvation. Loss of BBS1 resulted in shorter cilia. Ciliary length was measured by ARL13B staining.</p>
        <p>Short.</p>
        <fig id="f1">
          <caption><p>Overexpression of BBS1 produced elongated cilia in rescued cells.</p></caption>
        </fig>
      </sec>
    </body>
    <back>
      <ref-list>
        <ref><element-citation><article-title>Unrelated reference title</article-title></element-citation></ref>
      </ref-list>
    </back>
  </article>
</pmc-articleset>"#;

/// A PMC article whose body has section text but no paragraph or caption elements.
pub const PMC_SECTION_ONLY: &str = r#"<pmc-articleset>
  <article>
    <front>
      <article-meta>
        <article-id pub-id-type="PMCID">PMC7000002</article-id>
        <title-group><article-title>Section-only layout</article-title></title-group>
      </article-meta>
    </front>
    <body>
      <sec><title>Findings</title> Knockdown of TTLL5 reduced cilia-generated fluid flow.</sec>
      <sec>x</sec>
    </body>
  </article>
</pmc-articleset>"#;

/// Truncated XML: the extractors must degrade to zero records.
pub const MALFORMED_XML: &str = r#"<PubmedArticleSet><PubmedArticle><MedlineCitation><PMID>1</PMID></PubmedArticle>"#;
